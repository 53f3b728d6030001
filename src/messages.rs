//! The message catalog.
//!
//! All user-facing prose is fetched by key so operators can reword every
//! prompt and error from the config file without touching code. Compiled-in
//! defaults cover every key the server uses; `[messages]` entries in the
//! config override them. Templates may reference `{name}`-style
//! placeholders filled in at render time.

use std::collections::HashMap;
use tracing::warn;

/// Compiled-in default text for every catalog key the server emits.
const DEFAULTS: &[(&str, &str)] = &[
    // Prompts, one per connection state.
    ("prompt_name", "Enter your name, or 'new' to create a new character ..."),
    ("prompt_new_name", "Choose a name for your new character ..."),
    ("prompt_surname", "Your surname must be re-entered. Choose a surname ..."),
    ("prompt_new_surname", "Choose a surname ..."),
    ("prompt_password", "Enter your password ..."),
    ("prompt_new_password", "Choose a password ..."),
    ("prompt_password_reenter", "Re-enter the password to confirm it ..."),
    ("prompt_playing", ">"),
    // Greetings and server notices.
    ("greeting", "Welcome to {server}."),
    ("welcome", "Welcome, {name}!"),
    ("new_player", "You are new around here. Tread carefully."),
    ("existing_player", "Welcome back!"),
    ("motd", "-=- There is no news today. -=-"),
    ("server_player_joined", "{name} has joined the game."),
    ("server_player_left", "{name} has left the game."),
    ("server_password_attempt_exceeded", "Too many failed attempts. Goodbye."),
    ("server_flag_blocked", "You are not permitted to connect."),
    ("prompt_flag_blocked", "Goodbye."),
    ("goodbye", "See you next time."),
    // Recoverable login failures.
    ("error_name_blank", "The name cannot be blank."),
    ("error_name_invalid", "That name contains characters that are not allowed."),
    ("error_name_banned", "That name is not permitted here. Choose another."),
    ("error_name_exist", "That name is already taken. Choose another."),
    ("error_name_online", "{name} is already connected."),
    ("error_name_unknown", "No player by that name exists. Type 'new' to create one."),
    ("error_surname_blank", "The surname cannot be blank."),
    ("error_surname_invalid", "That surname contains reserved characters."),
    ("error_surname_cleared", "Your surname has been cleared and must be re-entered."),
    ("error_password_blank", "The password cannot be blank."),
    ("error_password_incorrect", "That password is incorrect."),
    ("error_password_confirm_failed", "Password and confirmation do not agree."),
    ("error_internal", "Something went wrong on our side. Try again."),
    // In-game odds and ends.
    ("room_description", "You are standing in a muddy field. The world stretches out around you."),
    ("say_you", "You say, \"{text}\""),
    ("say_other", "{name} says, \"{text}\""),
    ("error_say_blank", "Say what?"),
    ("who_online", "Online: {names}"),
    ("error_unknown_command", "Huh?"),
];

/// Keyed template store with config overrides over compiled-in defaults.
pub struct Catalog {
    overrides: HashMap<String, String>,
}

impl Catalog {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        for key in overrides.keys() {
            if !DEFAULTS.iter().any(|(k, _)| k == key) {
                warn!(key = %key, "message override for unknown catalog key");
            }
        }
        Self { overrides }
    }

    /// Raw template for a key. An unknown key renders as itself, which is
    /// loud enough to spot in testing without taking the connection down.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(text) = self.overrides.get(key) {
            return text;
        }
        DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(key)
    }

    /// Render a template, substituting `{placeholder}` pairs.
    pub fn render(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let mut text = self.get(key).to_string();
        for (name, value) in vars {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_prompt_key() {
        let catalog = Catalog::default();
        for state in crate::state::ConnState::ALL {
            let key = state.prompt_key();
            assert_ne!(catalog.get(key), key, "missing default for {key}");
        }
    }

    #[test]
    fn override_wins_over_default() {
        let mut overrides = HashMap::new();
        overrides.insert("motd".to_string(), "fresh news".to_string());
        let catalog = Catalog::new(overrides);
        assert_eq!(catalog.get("motd"), "fresh news");
        assert_eq!(catalog.get("welcome"), "Welcome, {name}!");
    }

    #[test]
    fn render_substitutes_placeholders() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.render("welcome", &[("name", "Alice Stone")]),
            "Welcome, Alice Stone!"
        );
        assert_eq!(
            catalog.render("server_player_joined", &[("name", "Bob")]),
            "Bob has joined the game."
        );
    }

    #[test]
    fn unknown_key_renders_as_itself() {
        let catalog = Catalog::default();
        assert_eq!(catalog.get("no_such_key"), "no_such_key");
    }
}
