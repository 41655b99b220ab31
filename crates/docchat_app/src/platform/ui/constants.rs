pub const PROMPT_HINT: &str = "Type a question, or /help for commands.";

pub const HELP_TEXT: &str = "\
Commands:
  /add <path>...    add files to the current session and upload them
  /pick <path>...   start a new session with the chosen files
  /drop <path>...   like /pick, but only PDF, DOC, DOCX and TXT types are accepted
  /rm <id>          remove a file from the list
  /url [<url>]      set the URL to process (no argument clears it)
  /process          process uploaded files and the URL
  /clear            clear the session here and on the server
  /files            show the file list
  /help             show this help
  /quit             exit
Anything else is sent to the assistant.";

pub const USER_LABEL: &str = "You";
pub const ASSISTANT_LABEL: &str = "Assistant";
pub const TYPING_TEXT: &str = "Assistant is typing...";
pub const PROCESSING_TEXT: &str = "Processing documents and URLs...";
pub const SESSION_RULE: &str = "------------------------------------------------------------";
