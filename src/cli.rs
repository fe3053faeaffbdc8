//! Command-line interface
//!
//! Supports:
//! - Checking keymap files for malformed entries and collisions
//! - Replaying a key sequence against the loaded keymaps
//! - Listing bindings, optionally for one command

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use chordmap::config::EngineConfig;
use chordmap::keymap::{
    check_keymap_yaml, load_keymaps, ChordRuntime, CommandLog, KeyAction, KeyContext, KeyEvent,
    KeySequence, KeybindingRegistry, KeymapSources, Scope, DEFAULT_KEYMAP_YAML,
};

/// Inspect and exercise chord keymaps
#[derive(Parser, Debug)]
#[command(name = "chordmap", version, about = "Keybinding resolution engine")]
pub struct CliArgs {
    /// Workspace whose `.chordmap/keymap.yaml` is loaded into the WORKSPACE scope
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report malformed entries and collisions in keymap files
    Check {
        /// Check only this file instead of the layered keymaps
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Press a key sequence and print what each key resolves to
    Replay {
        /// Keys to press, e.g. "ctrlcmd+k ctrlcmd+c"
        #[arg(long)]
        keys: String,

        /// Context entries as `key` or `key=value`
        #[arg(long = "context", value_name = "ENTRY")]
        context: Vec<String>,

        /// Focused element the events target
        #[arg(long)]
        target: Option<String>,

        /// Simulated time between key presses, in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 0)]
        delay_ms: u64,
    },
    /// List registered bindings
    List {
        /// Only bindings for this command
        #[arg(long)]
        command: Option<String>,

        /// Only bindings in this scope
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    Default,
    User,
    Workspace,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Default => Scope::Default,
            ScopeArg::User => Scope::User,
            ScopeArg::Workspace => Scope::Workspace,
        }
    }
}

/// Registry with defaults plus the user and workspace keymaps
fn load_registry(workspace: Option<&Path>) -> KeybindingRegistry {
    let mut registry = KeybindingRegistry::new();
    let summary = load_keymaps(&mut registry, &KeymapSources::discover(workspace));
    tracing::debug!(
        "Registered {} bindings ({} default, {} user, {} workspace)",
        summary.total(),
        summary.default,
        summary.user,
        summary.workspace
    );
    registry
}

/// Run the parsed command, writing human-readable output to `out`
///
/// Returns whether everything checked out.
pub fn run(args: CliArgs, out: &mut dyn Write) -> Result<bool> {
    let workspace = args.workspace.as_deref();
    match args.command {
        Command::Check { file } => match file {
            Some(path) => check_file(&path, out),
            None => check_layered(workspace, out),
        },
        Command::Replay {
            keys,
            context,
            target,
            delay_ms,
        } => {
            let registry = load_registry(workspace);
            let timeout = EngineConfig::load().chord_timeout();
            replay(
                registry,
                timeout,
                &keys,
                &context,
                target.as_deref(),
                Duration::from_millis(delay_ms),
                out,
            )?;
            Ok(true)
        }
        Command::List { command, scope } => {
            let registry = load_registry(workspace);
            list(&registry, command.as_deref(), scope.map(Scope::from), out)?;
            Ok(true)
        }
    }
}

fn check_file(path: &Path, out: &mut dyn Write) -> Result<bool> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    check_yaml(&path.display().to_string(), &yaml, out)
}

fn check_yaml(name: &str, yaml: &str, out: &mut dyn Write) -> Result<bool> {
    let problems =
        check_keymap_yaml(yaml).with_context(|| format!("{} is not a valid keymap", name))?;
    for (index, problem) in &problems {
        writeln!(out, "{}: entry {}: {}", name, index, problem)?;
    }
    Ok(problems.is_empty())
}

fn check_layered(workspace: Option<&Path>, out: &mut dyn Write) -> Result<bool> {
    let mut clean = check_yaml("<default keymap>", DEFAULT_KEYMAP_YAML, out)?;

    let sources = KeymapSources::discover(workspace);
    for path in [sources.user.as_deref(), sources.workspace.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| p.exists())
    {
        clean &= check_file(path, out)?;
    }

    let registry = load_registry(workspace);
    report_conflicts(&registry, out)?;
    if let Some(log) = chordmap::config_paths::log_file() {
        writeln!(out, "Log file: {}", log.display())?;
    }
    Ok(clean)
}

/// Print the collisions of each binding with the older bindings of its scope
fn report_conflicts(registry: &KeybindingRegistry, out: &mut dyn Write) -> Result<()> {
    for scope in Scope::ALL {
        let bindings = registry.bindings(scope);
        for (i, binding) in bindings.iter().enumerate() {
            if let Some(conflict) = registry.validate_keybinding(&bindings[i + 1..], binding) {
                writeln!(
                    out,
                    "{} scope: {} ({}): {}",
                    scope, binding.command, binding.keybinding, conflict
                )?;
            }
        }
    }
    Ok(())
}

fn replay(
    registry: KeybindingRegistry,
    timeout: Duration,
    keys: &str,
    context: &[String],
    target: Option<&str>,
    delay: Duration,
    out: &mut dyn Write,
) -> Result<()> {
    let sequence =
        KeySequence::parse(keys).with_context(|| format!("Invalid key sequence `{}`", keys))?;
    let context = KeyContext::from_pairs(context.iter().map(String::as_str));
    let mut runtime = ChordRuntime::new(registry).with_timeout(timeout);
    let mut executor = CommandLog::new();
    let mut now = Instant::now();

    for (i, code) in sequence.iter().enumerate() {
        if i > 0 {
            now += delay;
            if runtime.tick(now) {
                writeln!(out, "(chord timed out)")?;
            }
        }

        let mut event = KeyEvent::from_key_code(*code);
        if let Some(target) = target {
            event = event.with_target(target);
        }
        let label = runtime
            .registry()
            .accelerator_for_sequence(&KeySequence::from(vec![*code]), "+")
            .join("");
        let action = runtime.run(&event, now, &context, &mut executor);
        writeln!(out, "{} => {}", label, describe(&action))?;
    }
    Ok(())
}

fn describe(action: &KeyAction) -> String {
    match action {
        KeyAction::Executed { command } => format!("execute {}", command),
        KeyAction::Passthrough { command } => format!("pass through ({})", command),
        KeyAction::AwaitMore(_) => "waiting for more keys".to_string(),
        KeyAction::NoMatch => "no match".to_string(),
        KeyAction::Ignored => "ignored".to_string(),
    }
}

fn list(
    registry: &KeybindingRegistry,
    command: Option<&str>,
    scope: Option<Scope>,
    out: &mut dyn Write,
) -> Result<()> {
    let scopes: Vec<Scope> = match scope {
        Some(scope) => vec![scope],
        None => Scope::BY_AUTHORITY.to_vec(),
    };

    for scope in scopes {
        for binding in registry
            .bindings(scope)
            .iter()
            .filter(|b| command.map_or(true, |c| b.command == c))
        {
            let label = match registry.accelerator_for(binding, "+") {
                Ok(labels) => labels.join(" "),
                Err(_) => binding.keybinding.clone(),
            };
            let when = binding
                .when
                .as_ref()
                .map(|w| format!("  when {}", w))
                .unwrap_or_default();
            writeln!(
                out,
                "[{}] {:<24} {}{}",
                scope, label, binding.command, when
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordmap::keymap::{load_default_keymap, Keybinding};

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn registry(bindings: &[(&str, &str)]) -> KeybindingRegistry {
        let mut registry = KeybindingRegistry::new();
        for (command, key) in bindings {
            registry.register_keybinding(Keybinding::new(*command, *key), Scope::Default);
        }
        registry
    }

    #[test]
    fn test_parse_replay_args() {
        let args = CliArgs::try_parse_from([
            "chordmap",
            "replay",
            "--keys",
            "ctrl+k ctrl+c",
            "--context",
            "editorFocus",
            "--context",
            "resourceScheme=file",
        ])
        .unwrap();
        match args.command {
            Command::Replay { keys, context, .. } => {
                assert_eq!(keys, "ctrl+k ctrl+c");
                assert_eq!(context, vec!["editorFocus", "resourceScheme=file"]);
            }
            other => panic!("Expected Replay, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_scope() {
        let args =
            CliArgs::try_parse_from(["chordmap", "list", "--scope", "user", "--verbose"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(
            args.command,
            Command::List {
                scope: Some(ScopeArg::User),
                ..
            }
        ));
    }

    #[test]
    fn test_replay_chord() {
        let text = output(|out| {
            replay(
                registry(&[("comment", "ctrl+k ctrl+c")]),
                Duration::from_secs(5),
                "ctrl+k ctrl+c",
                &[],
                None,
                Duration::ZERO,
                out,
            )
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("waiting for more keys"));
        assert!(lines[1].ends_with("execute comment"));
    }

    #[test]
    fn test_replay_times_out() {
        let text = output(|out| {
            replay(
                registry(&[("comment", "ctrl+k ctrl+c")]),
                Duration::from_millis(100),
                "ctrl+k ctrl+c",
                &[],
                None,
                Duration::from_millis(200),
                out,
            )
        });
        assert!(text.contains("(chord timed out)"));
        assert!(text.trim_end().ends_with("no match"));
    }

    #[test]
    fn test_replay_rejects_bad_keys() {
        let mut buf = Vec::new();
        let result = replay(
            KeybindingRegistry::new(),
            Duration::from_secs(5),
            "ctrl+nokey",
            &[],
            None,
            Duration::ZERO,
            &mut buf,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_list_filters_by_command() {
        let mut registry = KeybindingRegistry::new();
        load_default_keymap(&mut registry);
        let text = output(|out| {
            list(
                &registry,
                Some("workbench.action.showCommands"),
                None,
                out,
            )
        });
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("[default]")));
    }

    #[test]
    fn test_check_yaml_reports_entries() {
        let yaml = "bindings:\n  - key: ctrl+s\n    command: save\n  - key: ctrl+zz\n    command: bad\n";
        let mut buf = Vec::new();
        let clean = check_yaml("test.yaml", yaml, &mut buf).unwrap();
        assert!(!clean);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("test.yaml: entry 1:"));
    }

    #[test]
    fn test_report_conflicts_names_duplicate() {
        let registry = registry(&[("save", "ctrl+s"), ("saveAll", "ctrl+s")]);
        let text = output(|out| report_conflicts(&registry, out));
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("default scope: saveAll"));
        assert!(text.contains("Keybinding collides with save"));
    }
}
