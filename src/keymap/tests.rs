//! Integration tests for the keymap system against the embedded default keymap

use std::time::Instant;

use super::*;

fn default_runtime() -> ChordRuntime {
    let mut registry = KeybindingRegistry::new();
    load_default_keymap(&mut registry);
    ChordRuntime::new(registry)
}

fn cmd(c: char) -> KeyEvent {
    KeyEvent::from_key_code(KeyCode::cmd(c))
}

fn key(k: Key) -> KeyEvent {
    KeyEvent::new(k, Modifiers::NONE)
}

fn press(rt: &mut ChordRuntime, event: &KeyEvent, ctx: &KeyContext) -> KeyAction {
    rt.run(event, Instant::now(), ctx, &mut CommandLog::new())
}

fn executed(command: &str) -> KeyAction {
    KeyAction::Executed {
        command: command.to_string(),
    }
}

#[test]
fn test_embedded_yaml_is_clean() {
    let problems = check_keymap_yaml(DEFAULT_KEYMAP_YAML)
        .expect("Embedded keymap.yaml should parse successfully");
    assert!(problems.is_empty(), "unexpected problems: {:?}", problems);
}

#[test]
fn test_every_default_binding_registers() {
    let mut registry = KeybindingRegistry::new();
    let expected = default_bindings().len();
    assert_eq!(load_default_keymap(&mut registry), expected);
    assert_eq!(registry.bindings(Scope::Default).len(), expected);
}

#[test]
fn test_default_save() {
    let mut rt = default_runtime();
    let action = press(&mut rt, &cmd('s'), &KeyContext::new());
    assert_eq!(action, executed("workbench.action.files.save"));
    assert!(action.prevents_default());
}

#[test]
fn test_default_chord_waits_then_fires() {
    let mut rt = default_runtime();
    let ctx = KeyContext::new().with("editorTextFocus", true);

    assert!(matches!(
        press(&mut rt, &cmd('k'), &ctx),
        KeyAction::AwaitMore(_)
    ));
    assert_eq!(rt.state(), ChordState::AwaitingContinuation);
    assert_eq!(
        press(&mut rt, &cmd('c'), &ctx),
        executed("editor.action.addCommentLine")
    );
    assert_eq!(rt.state(), ChordState::Idle);
}

#[test]
fn test_default_chord_blocked_by_when_clause() {
    let mut rt = default_runtime();
    let readonly = KeyContext::new()
        .with("editorTextFocus", true)
        .with("editorReadonly", true);

    // closeAllEditors still keeps the chord alive
    assert!(matches!(
        press(&mut rt, &cmd('k'), &readonly),
        KeyAction::AwaitMore(_)
    ));
    assert_eq!(press(&mut rt, &cmd('c'), &readonly), KeyAction::NoMatch);
    assert_eq!(rt.state(), ChordState::Idle);
}

#[test]
fn test_terminal_copy_outranks_clipboard_copy() {
    let mut rt = default_runtime();
    let terminal = KeyContext::new()
        .with("terminalFocus", true)
        .with("terminalTextSelected", true);
    assert_eq!(
        press(&mut rt, &cmd('c'), &terminal),
        executed("workbench.action.terminal.copySelection")
    );
    assert_eq!(
        press(&mut rt, &cmd('c'), &KeyContext::new()),
        executed("editor.action.clipboardCopyAction")
    );
}

#[test]
fn test_tab_needs_selection() {
    let mut rt = default_runtime();
    let selection = KeyContext::new().with("editorHasSelection", true);
    assert_eq!(
        press(&mut rt, &key(Key::Tab), &selection),
        executed("editor.action.indentLines")
    );
    assert_eq!(press(&mut rt, &key(Key::Tab), &KeyContext::new()), KeyAction::NoMatch);
}

#[test]
fn test_passthrough_bindings() {
    let mut rt = default_runtime();
    let action = press(&mut rt, &cmd('q'), &KeyContext::new());
    assert_eq!(
        action,
        KeyAction::Passthrough {
            command: PASSTHROUGH_COMMAND.to_string()
        }
    );
    assert!(!action.prevents_default());

    let webview = KeyContext::new().with("resourceScheme", "vscode-webview");
    assert!(matches!(
        press(&mut rt, &key(Key::Escape), &webview),
        KeyAction::Passthrough { .. }
    ));

    let quick_open = KeyContext::new().with("inQuickOpen", true);
    assert_eq!(
        press(&mut rt, &key(Key::Escape), &quick_open),
        executed("workbench.action.closeQuickOpen")
    );
}

#[test]
fn test_user_scope_overrides_default() {
    let mut rt = default_runtime();
    rt.registry_mut().register_keybinding(
        Keybinding::new("myExtension.save", "ctrlcmd+s"),
        Scope::User,
    );
    assert_eq!(
        press(&mut rt, &cmd('s'), &KeyContext::new()),
        executed("myExtension.save")
    );

    rt.reset_keybindings();
    assert_eq!(
        press(&mut rt, &cmd('s'), &KeyContext::new()),
        executed("workbench.action.files.save")
    );
}

#[test]
fn test_keybindings_for_default_command() {
    let mut registry = KeybindingRegistry::new();
    load_default_keymap(&mut registry);
    let found = registry.get_keybindings_for_command("workbench.action.showCommands");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|b| b.scope == Scope::Default));
}
