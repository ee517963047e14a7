// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1244;

// Client->server commands
pub const EXIT_COMMAND: &str = "/exit";
pub const BAN_LIST_COMMAND: &str = "/ban";

// Server->client protocol lines. The welcome line must start with "Welcome":
// the client treats that prefix as the registration-accepted signal, so the
// rejection line must never start with it.
pub const WELCOME_LINE: &str = "Welcome to the chat";
pub const NAME_TAKEN_LINE: &str = "This user name already used";
pub const ROSTER_HEADER: &str = "Users in the chat:";
pub const BANNED_WORD_WARNING: &str = "You are not allowed to write this word";

pub const USAGE_LINES: [&str; 4] = [
    "To use this chat you can use:",
    "Now you are in a group chat, where you can write to all recipients",
    "'@' - to tag someone (one or more people)",
    "'-' - to tag all people without one",
];
