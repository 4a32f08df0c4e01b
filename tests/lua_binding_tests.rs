use luacurses::core::config::ScreenOptions;
use luacurses::lua::{create_module, preload};
use luacurses::screen::Screen;
use luacurses::screen::input::ScriptedKeys;
use mlua::Lua;
use ratatui::backend::TestBackend;

// ============================================================================
// Helper Functions
// ============================================================================

/// A Lua state where `require("libcurses")` opens 20x5 test screens that
/// read from `keys`.
fn lua_with_keys(keys: ScriptedKeys, color: bool) -> Lua {
    let lua = Lua::new();
    let module = create_module(&lua, move || {
        Screen::new(TestBackend::new(20, 5), keys.clone(), color, ScreenOptions::default())
    })
    .unwrap();
    preload(&lua, module).unwrap();
    lua.load(r#"curses = require("libcurses")"#).exec().unwrap();
    lua
}

fn lua_state() -> Lua {
    lua_with_keys(ScriptedKeys::new(), true)
}

/// Runs `script` and returns the error message it raised.
fn error_of(lua: &Lua, script: &str) -> String {
    match lua.load(script).exec() {
        Ok(()) => panic!("Expected script to fail: {script}"),
        Err(e) => e.to_string(),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_init_returns_active_handle() {
    let lua = lua_state();
    let (active, color): (bool, bool) = lua
        .load("local scr = curses.init() return curses.isactive(scr), curses.iscolor(scr)")
        .eval()
        .unwrap();
    assert!(active);
    assert!(color);
}

#[test]
fn test_destroy_marks_handle_inactive() {
    let lua = lua_state();
    let active: bool = lua
        .load("local scr = curses.init() curses.destroy(scr) return curses.isactive(scr)")
        .eval()
        .unwrap();
    assert!(!active);
}

#[test]
fn test_iscolor_is_fixed_for_handle_lifetime() {
    let lua = lua_with_keys(ScriptedKeys::new(), false);
    let (before, after): (bool, bool) = lua
        .load(
            r#"
            local scr = curses.init()
            local before = curses.iscolor(scr)
            curses.write(scr, "x", 1, 2)
            curses.refresh(scr)
            curses.destroy(scr)
            return before, curses.iscolor(scr)
            "#,
        )
        .eval()
        .unwrap();
    assert!(!before);
    assert!(!after);
}

#[test]
fn test_operations_on_destroyed_handle_fail() {
    let lua = lua_state();
    let msg = error_of(
        &lua,
        "local scr = curses.init() curses.destroy(scr) curses.write(scr, 'x', 0, 0)",
    );
    assert!(msg.contains("Screen has been destroyed"), "{msg}");
}

// ============================================================================
// Handle type checking
// ============================================================================

#[test]
fn test_missing_handle_is_an_argument_error() {
    let lua = lua_state();
    for script in [
        "curses.refresh()",
        "curses.iscolor(42)",
        "curses.write({}, 'x', 0, 0)",
    ] {
        let msg = error_of(&lua, script);
        assert!(msg.contains("bad argument #1"), "{script}: {msg}");
    }
}

#[test]
fn test_handle_from_another_module_is_rejected() {
    // Same Lua state, different screen type behind the userdata.
    let lua = lua_state();
    let other = create_module(&lua, || {
        Screen::new(TestBackend::new(4, 4), TestKeys, true, ScreenOptions::default())
    })
    .unwrap();
    lua.globals().set("other", other).unwrap();

    let msg = error_of(&lua, "local scr = other.init() curses.clear(scr)");
    assert!(msg.contains("bad argument #1"), "{msg}");
}

struct TestKeys;

impl luacurses::screen::input::KeySource for TestKeys {
    fn next_char(&mut self, _blocking: bool) -> std::io::Result<Option<char>> {
        Ok(None)
    }
}

// ============================================================================
// Cursor and size
// ============================================================================

#[test]
fn test_getsize_returns_width_then_height() {
    let lua = lua_state();
    let (w, h): (i64, i64) = lua
        .load("local scr = curses.init() return curses.getsize(scr)")
        .eval()
        .unwrap();
    assert_eq!((w, h), (20, 5));
}

#[test]
fn test_setcursor_then_getcursor() {
    let lua = lua_state();
    let (x, y): (i64, i64) = lua
        .load("local scr = curses.init() curses.setcursor(scr, 19, 4) return curses.getcursor(scr)")
        .eval()
        .unwrap();
    assert_eq!((x, y), (19, 4));
}

#[test]
fn test_setcursor_out_of_range_keeps_cursor() {
    let lua = lua_state();
    let (ok, msg, x, y): (bool, String, i64, i64) = lua
        .load(
            r#"
            local scr = curses.init()
            curses.setcursor(scr, 3, 2)
            local ok, err = pcall(curses.setcursor, scr, 20, 0)
            local x, y = curses.getcursor(scr)
            return ok, tostring(err), x, y
            "#,
        )
        .eval()
        .unwrap();
    assert!(!ok);
    assert!(
        msg.contains("Column out of range. Expected value in [0, 20) but got 20"),
        "{msg}"
    );
    assert_eq!((x, y), (3, 2));

    let msg = error_of(&lua, "local scr = curses.init() curses.setcursor(scr, 0, 5)");
    assert!(msg.contains("Row out of range. Expected value in [0, 5) but got 5"), "{msg}");
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_rejects_colors_outside_palette() {
    let lua = lua_state();
    let msg = error_of(&lua, "local scr = curses.init() curses.write(scr, 'x', 8, 0)");
    assert!(msg.contains("Invalid fg color: 8"), "{msg}");
    let msg = error_of(&lua, "local scr = curses.init() curses.write(scr, 'x', 0, -1)");
    assert!(msg.contains("Invalid bg color: -1"), "{msg}");
}

#[test]
fn test_write_accepts_every_palette_pair() {
    let lua = lua_state();
    lua.load(
        r##"
        local scr = curses.init()
        for _, fg in pairs(curses.colors) do
            for _, bg in pairs(curses.colors) do
                curses.setcursor(scr, 0, 0)
                curses.write(scr, "#", fg, bg)
            end
        end
        "##,
    )
    .exec()
    .unwrap();
}

#[test]
fn test_write_shows_invalid_utf8_as_replacement() {
    let lua = lua_state();
    let (x, y): (i64, i64) = lua
        .load(
            r#"
            local scr = curses.init()
            curses.write(scr, "caf\xe9!", curses.colors.WHITE, curses.colors.BLACK)
            return curses.getcursor(scr)
            "#,
        )
        .eval()
        .unwrap();
    // "caf", U+FFFD, "!"
    assert_eq!((x, y), (5, 0));
}

#[test]
fn test_write_advances_cursor_without_refresh() {
    let lua = lua_state();
    let (x, y): (i64, i64) = lua
        .load(
            r#"
            local scr = curses.init()
            curses.write(scr, "hello", curses.colors.WHITE, curses.colors.BLACK)
            return curses.getcursor(scr)
            "#,
        )
        .eval()
        .unwrap();
    assert_eq!((x, y), (5, 0));
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn test_non_blocking_read_without_input_is_empty() {
    let lua = lua_state();
    let text: String = lua
        .load("local scr = curses.init() return curses.read(scr, 10, false)")
        .eval()
        .unwrap();
    assert_eq!(text, "");
}

#[test]
fn test_read_never_exceeds_n() {
    let keys = ScriptedKeys::from_text("abcdef");
    let lua = lua_with_keys(keys.clone(), true);
    let text: String = lua
        .load("local scr = curses.init() return curses.read(scr, 3, true)")
        .eval()
        .unwrap();
    assert_eq!(text, "abc");
    assert_eq!(keys.pending(), 3);
}

#[test]
fn test_read_length_cap() {
    let lua = lua_state();
    let msg = error_of(&lua, "local scr = curses.init() curses.read(scr, 1025, false)");
    assert!(msg.contains("Cannot read more than 1024 characters"), "{msg}");

    let text: String = lua
        .load("local scr = curses.init() return curses.read(scr, 1024)")
        .eval()
        .unwrap();
    assert_eq!(text, "");
}

#[test]
fn test_readline_returns_line_without_terminator() {
    let lua = lua_with_keys(ScriptedKeys::from_text("name\nrest"), true);
    let (line, partial): (String, String) = lua
        .load(
            r#"
            local scr = curses.init()
            return curses.readline(scr, true), curses.readline(scr, false)
            "#,
        )
        .eval()
        .unwrap();
    assert_eq!(line, "name");
    assert_eq!(partial, "rest");
}

#[test]
fn test_readline_is_bounded() {
    let long = "y".repeat(3000);
    let lua = lua_with_keys(ScriptedKeys::from_text(&format!("{long}\n")), true);
    let len: i64 = lua
        .load("local scr = curses.init() return #curses.readline(scr, true)")
        .eval()
        .unwrap();
    assert_eq!(len, 1024);
}

#[test]
fn test_setecho_toggles_echo() {
    let lua = lua_with_keys(ScriptedKeys::from_text("ab"), true);
    let (x_after_silent, x_after_echo): (i64, i64) = lua
        .load(
            r#"
            local scr = curses.init()
            curses.setecho(scr, false)
            curses.read(scr, 1, false)
            local silent = curses.getcursor(scr)
            curses.setecho(scr, true)
            curses.read(scr, 1, false)
            local echoed = curses.getcursor(scr)
            return silent, echoed
            "#,
        )
        .eval()
        .unwrap();
    assert_eq!(x_after_silent, 0);
    assert_eq!(x_after_echo, 1);
}
