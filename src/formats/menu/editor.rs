//! Menu editing operations
//!
//! Structural mutations on the command list: append, remove-by-position,
//! move-by-position, plus parameter editing on generic commands. Every
//! structural mutation revalidates `active_index` so it points at a live
//! command or is `None` when the list is empty.

use super::registry::{self, PayloadKind};
use super::{AttachPointCommand, GenericCommand, Menu, MenuCommand, PropertyCommand};

impl Menu {
    /// Append a command to the end of the list.
    ///
    /// Returns the new command's position.
    pub fn append_command(&mut self, command: MenuCommand) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    /// Construct the registry-appropriate payload for `tag`, append it,
    /// and return its position. Unregistered tags get an empty generic
    /// payload.
    pub fn new_command(&mut self, tag: &str) -> usize {
        let command = match registry::payload_kind(tag) {
            PayloadKind::AttachPoint => MenuCommand::AttachPoint(AttachPointCommand {
                tag: tag.to_string(),
                slot_name: "Attach Point".to_string(),
                location: [0.0; 3],
                rotation: [0.0; 3],
            }),
            PayloadKind::Property => MenuCommand::Property(PropertyCommand {
                tag: tag.to_string(),
                prop_name: "prop name".to_string(),
                value: 50.0,
            }),
            PayloadKind::Generic => MenuCommand::Generic(GenericCommand {
                tag: tag.to_string(),
                params: Vec::new(),
            }),
        };
        self.append_command(command)
    }

    /// Remove the command at `index`.
    ///
    /// Returns the removed command, or `None` if `index` is out of range.
    pub fn remove_command(&mut self, index: usize) -> Option<MenuCommand> {
        if index >= self.commands.len() {
            return None;
        }
        let removed = self.commands.remove(index);

        self.active_index = if self.commands.is_empty() {
            None
        } else {
            self.active_index.map(|active| {
                if active > index {
                    active - 1
                } else {
                    active.min(self.commands.len() - 1)
                }
            })
        };
        Some(removed)
    }

    /// Move the command at `from` to position `to`, shifting the ones in
    /// between. Out-of-range positions are clamped to the list end.
    ///
    /// Returns the command's final position, or `None` on an empty list
    /// or out-of-range `from`.
    pub fn move_command(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.commands.len() {
            return None;
        }
        let to = to.min(self.commands.len() - 1);
        if from != to {
            let command = self.commands.remove(from);
            self.commands.insert(to, command);

            self.active_index = self.active_index.map(|active| {
                if active == from {
                    to
                } else if from < active && active <= to {
                    active - 1
                } else if to <= active && active < from {
                    active + 1
                } else {
                    active
                }
            });
        }
        Some(to)
    }
}

impl GenericCommand {
    /// Append a parameter, returning its position.
    pub fn add_param(&mut self, value: impl Into<String>) -> usize {
        self.params.push(value.into());
        self.params.len() - 1
    }

    /// Remove the parameter at `index`, or `None` if out of range.
    pub fn remove_param(&mut self, index: usize) -> Option<String> {
        if index >= self.params.len() {
            return None;
        }
        Some(self.params.remove(index))
    }

    /// Move a parameter from `from` to `to` (clamped).
    pub fn move_param(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.params.len() {
            return None;
        }
        let to = to.min(self.params.len() - 1);
        if from != to {
            let param = self.params.remove(from);
            self.params.insert(to, param);
        }
        Some(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn menu_with(tags: &[&str]) -> Menu {
        let mut menu = Menu::default();
        for tag in tags {
            menu.new_command(tag);
        }
        menu
    }

    #[test]
    fn new_command_uses_registry_payloads() {
        let mut menu = Menu::default();
        menu.new_command("アタッチポイントの設定");
        menu.new_command("prop");
        menu.new_command("additem");

        assert!(matches!(menu.commands[0], MenuCommand::AttachPoint(_)));
        assert!(matches!(menu.commands[1], MenuCommand::Property(_)));
        assert!(matches!(menu.commands[2], MenuCommand::Generic(_)));
    }

    #[test]
    fn remove_shifts_active_index() {
        let mut menu = menu_with(&["category", "additem", "delitem", "prop"]);
        menu.active_index = Some(2);

        // removing before the cursor shifts it down
        menu.remove_command(0);
        assert_eq!(menu.active_index, Some(1));
        assert_eq!(menu.active_command().unwrap().tag(), "delitem");

        // removing at the cursor keeps it clamped on a live entry
        menu.remove_command(1);
        assert_eq!(menu.active_index, Some(1));
        assert_eq!(menu.active_command().unwrap().tag(), "prop");
    }

    #[test]
    fn emptying_the_list_clears_active_index() {
        let mut menu = menu_with(&["category"]);
        menu.active_index = Some(0);
        assert!(menu.remove_command(0).is_some());
        assert_eq!(menu.active_index, None);
        assert!(menu.active_command().is_none());
    }

    #[test]
    fn remove_out_of_range_is_a_noop() {
        let mut menu = menu_with(&["category"]);
        menu.active_index = Some(0);
        assert!(menu.remove_command(5).is_none());
        assert_eq!(menu.commands.len(), 1);
        assert_eq!(menu.active_index, Some(0));
    }

    #[test]
    fn move_tracks_the_active_command() {
        let mut menu = menu_with(&["category", "additem", "delitem", "prop"]);

        // cursor rides the moved command
        menu.active_index = Some(0);
        menu.move_command(0, 2);
        assert_eq!(menu.active_index, Some(2));
        assert_eq!(menu.commands[2].tag(), "category");

        // cursor on a displaced command shifts with it
        menu.active_index = Some(1);
        menu.move_command(3, 0);
        assert_eq!(menu.active_index, Some(2));
    }

    #[test]
    fn move_clamps_destination() {
        let mut menu = menu_with(&["category", "additem"]);
        assert_eq!(menu.move_command(0, 99), Some(1));
        assert_eq!(menu.commands[1].tag(), "category");
    }

    #[test]
    fn generic_param_editing() {
        let mut command = GenericCommand {
            tag: "setstr".to_string(),
            params: Vec::new(),
        };
        command.add_param("a");
        command.add_param("b");
        command.add_param("c");

        command.move_param(2, 0);
        assert_eq!(command.params, vec!["c", "a", "b"]);

        assert_eq!(command.remove_param(1).as_deref(), Some("a"));
        assert_eq!(command.params, vec!["c", "b"]);
        assert!(command.remove_param(9).is_none());
    }
}
