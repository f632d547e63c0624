//! Minimal CLI: node tree JSON → (rendered document | check summary)
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, warn};

use blockkit_jsx::node::Node;
use blockkit_jsx::{path_de, Rendered};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// render declarative block-kit node trees (JSON) into the documents the messaging API expects
#[derive(Parser, Debug)]
#[command(name = "blockkit", version)]
pub struct CommandLineInterface {
    /// log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render every input tree and print the documents
    Render(RenderOut),
    /// render every input tree and print a one-line summary per tree
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (one tree per line)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the tree inside each document (e.g. /payload/view)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// single-line JSON instead of pretty printed
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

/// One decoded tree and where it came from.
struct Source {
    label: String,
    node: Node,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Source>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            if self.ndjson {
                for (index, line) in source.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
                    let label = format!("{source_path_str}:{}", index + 1);
                    out.push(self.decode(label, line)?);
                }
            } else {
                out.push(self.decode(source_path_str, &source)?);
            }
        }
        Ok(out)
    }

    fn decode(&self, label: String, source: &str) -> Result<Source> {
        let node = match self.json_pointer.as_deref() {
            None => path_de::node_from_str(source).with_context(|| format!("in {label}"))?,
            Some(pointer) => {
                let mut document = serde_json::from_str::<Value>(source)
                    .with_context(|| format!("failed to parse JSON source ({label})"))?;
                let selected = document
                    .pointer_mut(pointer)
                    .map(Value::take)
                    .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {label}"))?;
                path_de::from_value_with_path::<Node>(selected).with_context(|| format!("in {label}"))?
            }
        };
        debug!(%label, kind = node.kind(), "decoded tree");
        Ok(Source { label, node })
    }
}

impl Source {
    fn render(&self) -> Result<Rendered> {
        futures::executor::block_on(blockkit_jsx::render(&self.node)).map_err(|error| {
            if error.is_authoring_error() {
                warn!(label = %self.label, %error, "tree rejected");
            } else {
                warn!(label = %self.label, %error, "render abandoned");
            }
            anyhow::Error::new(error).context(format!("failed to render {}", self.label))
        })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                let mut rendered = Vec::new();
                for source in target.input_settings.load()? {
                    rendered.push(source.render()?.document);
                }
                let output = if rendered.len() == 1 { rendered.remove(0) } else { Value::Array(rendered) };
                let output_src = if target.compact {
                    serde_json::to_string(&output)?
                } else {
                    serde_json::to_string_pretty(&output)?
                };

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &output_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{output_src}");
                }
                Ok(())
            }
            Command::Check(target) => {
                let stdout = std::io::stdout();
                let mut stdout = stdout.lock();
                for source in target.input_settings.load()? {
                    let rendered = source.render()?;
                    let blocks = rendered.document.get("blocks").and_then(Value::as_array).map_or(0, Vec::len);
                    let actions = rendered.registry.action_ids().collect::<Vec<_>>().join(",");
                    writeln!(
                        stdout,
                        "ok {} kind={} blocks={blocks} actions=[{actions}]",
                        source.label,
                        source.node.kind(),
                    )?;
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let err = resolve_file_path_patterns(["/definitely/not/here/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn json_pointer_selects_the_tree() {
        let settings = InputSettings { ndjson: false, json_pointer: Some("/view".into()), input: Vec::new() };
        let source = settings
            .decode("inline".into(), r#"{ "view": { "kind": "Home" } }"#)
            .unwrap();
        assert_eq!(source.node.kind(), "Home");

        let err = settings.decode("inline".into(), r#"{ "other": 1 }"#).err().unwrap();
        assert!(err.to_string().contains("selects nothing"));
    }

    #[test]
    fn cli_parses_render_flags() {
        let cli = CommandLineInterface::try_parse_from(["blockkit", "render", "-i", "a.json", "--compact", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.cmd, Command::Render(RenderOut { compact: true, .. })));
    }

    #[test]
    fn render_failure_names_the_source() {
        let settings = InputSettings { ndjson: false, json_pointer: None, input: Vec::new() };
        let source = settings.decode("inline".into(), r#"{ "kind": "Modal" }"#).unwrap();
        let err = source.render().err().unwrap();
        assert!(err.to_string().contains("failed to render inline"), "{err}");
        assert!(err.root_cause().to_string().contains("`title`"), "{err:#}");
    }
}
