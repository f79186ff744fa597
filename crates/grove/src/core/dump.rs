use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use super::{focus::FocusManager, world::Core};
use crate::{
    EntityId, WindowId,
    error::{Error, Result},
};

/// Render a window's entity tree as indented, colored text showing each
/// entity's name, geometry and state flags. This is a debug function.
pub fn dump(core: &Core, window: WindowId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    let win = core.window(window)?;
    write!(buffer, "window {window:?} ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{}x{}", win.size().w, win.size().h)?;
    buffer.reset()?;
    writeln!(buffer)?;
    if let Some(root) = win.root() {
        dump_entity(&mut buffer, core, root, 1)?;
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Render a subtree without window decoration. Useful for detached trees.
pub fn dump_subtree(core: &Core, root: EntityId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_entity(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write a label in the field color followed by a value.
fn write_field(buffer: &mut Buffer, label: &str, value: &str) -> Result<()> {
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, " {label}")?;
    buffer.reset()?;
    write!(buffer, "={value}")?;
    Ok(())
}

/// Walk a subtree and emit one line per entity.
fn dump_entity(buffer: &mut Buffer, core: &Core, id: EntityId, level: usize) -> Result<()> {
    let entity = core
        .entity(id)
        .ok_or_else(|| Error::Internal(format!("dump: missing entity {id:?}")))?;
    let indent = "    ".repeat(level);
    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", entity.name())?;
    buffer.reset()?;
    write!(buffer, " {id:?}")?;

    let b = entity.bounds();
    let c = entity.clipped_bounds();
    let m = entity.min_size();
    write_field(buffer, "bounds", &format!("{},{} {}x{}", b.tl.x, b.tl.y, b.w, b.h))?;
    write_field(buffer, "clip", &format!("{},{} {}x{}", c.tl.x, c.tl.y, c.w, c.h))?;
    write_field(buffer, "min", &format!("{}x{}", m.w, m.h))?;

    let damaged = entity
        .window()
        .and_then(|w| core.window(w).ok())
        .is_some_and(|w| w.is_damaged(id));
    let flags = [
        ("FOCUSED", core.is_focused(id), Color::Magenta),
        ("SELECTED", entity.selected(), Color::Yellow),
        ("LAYOUT", entity.layout_invalid(), Color::Red),
        ("DAMAGED", damaged, Color::Red),
    ];
    for (label, set, color) in flags {
        if set {
            write!(buffer, " ")?;
            buffer.set_color(ColorSpec::new().set_fg(Some(color)))?;
            write!(buffer, "{label}")?;
            buffer.reset()?;
        }
    }
    writeln!(buffer)?;

    for child in entity.children() {
        dump_entity(buffer, core, *child, level + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geom::{Expanse, Rect};

    use super::*;
    use crate::testing::probe::Probe;

    #[test]
    fn dump_shows_tree_and_flags() -> Result<()> {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(20, 10));
        let root = core.create(Probe::container("root").selectable_container());
        let item = core.create(Probe::leaf("item").focusable().selectable().min_size(3, 1));
        core.adopt(root, item);
        core.set_root(window, Some(root))?;
        core.place_child(root, 0, Rect::new(1, 2, 5, 1));
        core.refresh_window(window)?;
        core.set_focus(window, Some(item));
        core.select_child(root, 0, true);

        let text = dump_subtree(&core, root)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("root "));
        assert!(lines[1].starts_with("    item "));
        assert!(lines[1].contains("bounds=1,2 5x1"));
        assert!(lines[1].contains("min=3x1"));
        assert!(lines[1].contains("FOCUSED"));
        assert!(lines[1].contains("SELECTED"));
        assert!(lines[1].contains("DAMAGED"));
        assert!(!lines[0].contains("FOCUSED"));

        assert!(dump(&core, window)?.contains("item"));
        Ok(())
    }
}
