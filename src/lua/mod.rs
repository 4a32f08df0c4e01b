//! # Lua Binding
//!
//! Builds the `libcurses` module table:
//!
//! ```lua
//! local curses = require("libcurses")
//! local scr = curses.init()
//! curses.setcursor(scr, 2, 1)
//! curses.write(scr, "hello", curses.colors.GREEN, curses.colors.BLACK)
//! curses.refresh(scr)
//! local key = curses.read(scr, 1, true)
//! curses.destroy(scr)
//! ```
//!
//! Every operation takes the screen handle first. The handle is a userdata
//! wrapping a [`Screen`]; passing anything else is an argument error raised
//! before the screen is touched. The same operations are also methods on the
//! handle (`scr:write(...)`).
//!
//! Errors surface as Lua runtime errors carrying the [`ScreenError`] message.

use std::io::Stdout;

use mlua::{
    FromLuaMulti, IntoLuaMulti, Lua, MetaMethod, Result as LuaResult, Table, UserData,
    UserDataMethods, UserDataRefMut,
};
use ratatui::backend::{Backend, CrosstermBackend};

use crate::core::color::Color;
use crate::core::config::ScreenOptions;
use crate::core::error::ScreenError;
use crate::screen::Screen;
use crate::screen::input::{CrosstermKeys, KeySource};

/// Name under which scripts `require` the module.
pub const MODULE_NAME: &str = "libcurses";

impl From<ScreenError> for mlua::Error {
    fn from(err: ScreenError) -> Self {
        mlua::Error::RuntimeError(err.to_string())
    }
}

// ============================================================================
// Operations
// ============================================================================

/// A screen operation as exposed to scripts: the handle plus Lua arguments.
type Op<B, K, A, R> = fn(&mut Screen<B, K>, A) -> Result<R, ScreenError>;

fn read<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    (n, blocking): (i64, bool),
) -> Result<String, ScreenError> {
    screen.read(n, blocking)
}

fn readline<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    blocking: bool,
) -> Result<String, ScreenError> {
    screen.readline(blocking)
}

fn iscolor<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, _: ()) -> Result<bool, ScreenError> {
    Ok(screen.is_color())
}

fn isactive<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, _: ()) -> Result<bool, ScreenError> {
    Ok(screen.is_active())
}

fn getsize<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    _: (),
) -> Result<(u16, u16), ScreenError> {
    screen.size()
}

fn getcursor<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    _: (),
) -> Result<(u16, u16), ScreenError> {
    Ok(screen.cursor())
}

fn setcursor<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    (x, y): (i64, i64),
) -> Result<(), ScreenError> {
    screen.set_cursor(x, y)
}

/// Lua strings are bytes; invalid UTF-8 is shown as U+FFFD.
fn write<B: Backend, K: KeySource>(
    screen: &mut Screen<B, K>,
    (text, fg, bg): (mlua::String, i64, i64),
) -> Result<(), ScreenError> {
    screen.write(&text.to_string_lossy(), fg, bg)
}

fn clear<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, _: ()) -> Result<(), ScreenError> {
    screen.clear()
}

fn refresh<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, _: ()) -> Result<(), ScreenError> {
    screen.refresh()
}

fn destroy<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, _: ()) -> Result<(), ScreenError> {
    screen.destroy();
    Ok(())
}

fn setecho<B: Backend, K: KeySource>(screen: &mut Screen<B, K>, echo: bool) -> Result<(), ScreenError> {
    screen.set_echo(echo);
    Ok(())
}

/// Somewhere operations can be registered: the module table or the
/// handle's method table.
trait OpSink<B: Backend, K: KeySource> {
    fn add<A, R>(&mut self, name: &str, op: Op<B, K, A, R>) -> LuaResult<()>
    where
        A: FromLuaMulti + 'static,
        R: IntoLuaMulti + 'static;
}

/// Registers every handle operation, in the order of the module table.
fn operations<B, K>(sink: &mut impl OpSink<B, K>) -> LuaResult<()>
where
    B: Backend + 'static,
    K: KeySource + 'static,
{
    sink.add("read", read)?;
    sink.add("readline", readline)?;
    sink.add("iscolor", iscolor)?;
    sink.add("isactive", isactive)?;
    sink.add("getsize", getsize)?;
    sink.add("getcursor", getcursor)?;
    sink.add("setcursor", setcursor)?;
    sink.add("write", write)?;
    sink.add("clear", clear)?;
    sink.add("refresh", refresh)?;
    sink.add("destroy", destroy)?;
    sink.add("setecho", setecho)?;
    Ok(())
}

struct ModuleSink<'a> {
    lua: &'a Lua,
    table: &'a Table,
}

impl<B, K> OpSink<B, K> for ModuleSink<'_>
where
    B: Backend + 'static,
    K: KeySource + 'static,
{
    fn add<A, R>(&mut self, name: &str, op: Op<B, K, A, R>) -> LuaResult<()>
    where
        A: FromLuaMulti + 'static,
        R: IntoLuaMulti + 'static,
    {
        let function = self.lua.create_function(
            move |_, (mut screen, args): (UserDataRefMut<Screen<B, K>>, A)| Ok(op(&mut screen, args)?),
        )?;
        self.table.set(name, function)
    }
}

struct MethodSink<'a, M>(&'a mut M);

impl<B, K, M> OpSink<B, K> for MethodSink<'_, M>
where
    B: Backend + 'static,
    K: KeySource + 'static,
    M: UserDataMethods<Screen<B, K>>,
{
    fn add<A, R>(&mut self, name: &str, op: Op<B, K, A, R>) -> LuaResult<()>
    where
        A: FromLuaMulti + 'static,
        R: IntoLuaMulti + 'static,
    {
        self.0
            .add_method_mut(name, move |_, screen, args: A| Ok(op(screen, args)?));
        Ok(())
    }
}

impl<B, K> UserData for Screen<B, K>
where
    B: Backend + 'static,
    K: KeySource + 'static,
{
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // Adding methods has no failure path.
        let _ = operations::<B, K>(&mut MethodSink(methods));

        methods.add_meta_method(MetaMethod::ToString, |_, screen, ()| {
            let state = if screen.is_active() { "active" } else { "destroyed" };
            Ok(format!("luacurses.Screen ({state})"))
        });
    }
}

// ============================================================================
// Module construction
// ============================================================================

/// Builds the `colors` table: color name → curses color constant.
pub fn colors_table(lua: &Lua) -> LuaResult<Table> {
    let colors = lua.create_table()?;
    for color in Color::ALL {
        colors.set(color.name(), color.id())?;
    }
    Ok(colors)
}

/// Builds the module table. `open` creates the screen behind each `init`.
pub fn create_module<B, K, F>(lua: &Lua, open: F) -> LuaResult<Table>
where
    B: Backend + 'static,
    K: KeySource + 'static,
    F: Fn() -> Result<Screen<B, K>, ScreenError> + 'static,
{
    let module = lua.create_table()?;
    module.set(
        "init",
        lua.create_function(move |lua, ()| lua.create_userdata(open()?))?,
    )?;
    operations::<B, K>(&mut ModuleSink {
        lua,
        table: &module,
    })?;
    module.set("colors", colors_table(lua)?)?;
    Ok(module)
}

/// The module over the controlling terminal.
pub fn terminal_module(lua: &Lua, options: ScreenOptions) -> LuaResult<Table> {
    create_module::<CrosstermBackend<Stdout>, CrosstermKeys, _>(lua, move || Screen::init(options))
}

/// Makes `require("libcurses")` return `module` in this Lua state.
pub fn preload(lua: &Lua, module: Table) -> LuaResult<()> {
    let loaded: Table = lua.globals().get::<Table>("package")?.get("loaded")?;
    loaded.set(MODULE_NAME, module)
}

/// Entry point for `require("libcurses")` from a host interpreter.
#[cfg(feature = "module")]
#[mlua::lua_module]
fn libcurses(lua: &Lua) -> LuaResult<Table> {
    let options = match crate::core::config::load_config() {
        Ok(config) => crate::core::config::resolve_screen(&config.screen),
        Err(e) => {
            log::warn!("Ignoring config: {}", e);
            ScreenOptions::default()
        }
    };
    terminal_module(lua, options)
}
