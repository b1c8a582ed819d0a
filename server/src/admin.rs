//! Operator console commands
//!
//! The console reads one command per line from stdin:
//! - `kill <name>`: zero the health of every player with that name
//! - `delete <name>`: forget the identity and its score
//! - `list`: print every identity

use crate::game::GameState;
use log::info;

pub const USAGE: &str = "commands: kill <name> | delete <name> | list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Kill(String),
    Delete(String),
    List,
}

impl AdminCommand {
    pub fn parse(line: &str) -> Option<AdminCommand> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        let target = words.next();

        match (command, target) {
            ("kill", Some(name)) => Some(AdminCommand::Kill(name.to_string())),
            ("delete", Some(name)) => Some(AdminCommand::Delete(name.to_string())),
            ("list", _) => Some(AdminCommand::List),
            _ => None,
        }
    }

    /// Applies the command and returns the lines to show the operator
    pub fn execute(&self, state: &mut GameState) -> Vec<String> {
        match self {
            AdminCommand::Kill(name) => {
                let killed = state.kill_by_name(name);
                info!("[ADMIN] kill {}: {} player(s)", name, killed);
                vec![format!("killed {} player(s) named {}", killed, name)]
            }
            AdminCommand::Delete(name) => match state.delete_identity(name) {
                Some(_) => {
                    info!("[ADMIN] deleted identity {}", name);
                    vec![format!("player {} deleted", name)]
                }
                None => vec![format!("no identity named {}", name)],
            },
            AdminCommand::List => {
                let mut lines = vec![format!("{:<20} {:>6}  {}", "name", "score", "origin")];
                lines.extend(state.sessions.iter().map(|(name, identity)| {
                    format!("{:<20} {:>6}  {}", name, identity.score, identity.origin)
                }));
                lines
            }
        }
    }
}
