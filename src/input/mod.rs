mod keybindings;

pub use keybindings::map_key_to_action;
