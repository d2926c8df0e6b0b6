//! Interactive REPL for calling editor tools
//!
//! Each line is `<tool> <action> [json params]`. JSON with unbalanced braces
//! continues on the next line.

use std::path::PathBuf;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};

use crate::workspace::{self, Workspace};

/// REPL state
pub struct Repl {
    workspace: Workspace,
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(workspace: Workspace) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(config)?;

        let history_path = history_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            workspace,
            editor,
            history_path,
        })
    }

    /// Run the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", WELCOME_MESSAGE);

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { "stagehand> " } else { "...> " };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.starts_with(':') && buffer.is_empty() {
                        match self.handle_command(trimmed) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                            CommandResult::Error(e) => {
                                eprintln!("Error: {}", e);
                                continue;
                            }
                        }
                    }

                    buffer.push_str(&line);
                    if !is_balanced(&buffer) {
                        buffer.push('\n');
                        continue;
                    }

                    let input = std::mem::take(&mut buffer);
                    if input.trim().is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(&input);
                    self.eval_and_print(&input);
                }
                Err(ReadlineError::Interrupted) => {
                    if buffer.is_empty() {
                        println!("Use :quit or Ctrl+D to exit");
                    } else {
                        println!("^C - input cancelled");
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Eof) => {
                    println!("\nGoodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    fn eval_and_print(&mut self, input: &str) {
        match workspace::parse_invocation(input) {
            Ok((tool, envelope)) => {
                let response = self.workspace.call(&tool, &envelope);
                println!("{}", response.to_json_pretty());
            }
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (command, args) = match cmd.split_once(' ') {
            Some((command, args)) => (command, Some(args.trim()).filter(|a| !a.is_empty())),
            None => (cmd, None),
        };

        match command {
            ":help" | ":h" | ":?" => {
                println!("{}", HELP_MESSAGE);
                CommandResult::Continue
            }
            ":quit" | ":q" | ":exit" => CommandResult::Exit,
            ":tools" | ":t" => {
                for tool in self.workspace.registry().tools() {
                    println!("  {:<22} {}", tool.name, tool.description);
                }
                CommandResult::Continue
            }
            ":actions" | ":a" => match workspace::describe_tools(self.workspace.registry(), args) {
                Ok(text) => {
                    print!("{text}");
                    CommandResult::Continue
                }
                Err(e) => CommandResult::Error(e.to_string()),
            },
            ":describe" | ":d" => self.describe(args),
            ":history" => {
                let document = self.workspace.document();
                let history = document.history();
                if history.is_empty() {
                    println!("No committed edits");
                }
                let first = document.committed_count() - history.len() + 1;
                for (i, label) in history.iter().enumerate() {
                    println!("  {:>3}  {}", first + i, label);
                }
                CommandResult::Continue
            }
            ":reset" => {
                self.workspace.reset();
                println!("Document reset");
                CommandResult::Continue
            }
            _ => CommandResult::Error(format!(
                "Unknown command: {}. Type :help for available commands.",
                command
            )),
        }
    }

    fn describe(&self, args: Option<&str>) -> CommandResult {
        let Some((tool, action)) = args.and_then(|a| a.split_once(' ')) else {
            return CommandResult::Error("Usage: :describe <tool> <action>".to_string());
        };
        let registry = self.workspace.registry();
        let descriptor = workspace::resolve_tool(registry, tool)
            .and_then(|name| registry.descriptor(name, action.trim()));
        match descriptor {
            Some(descriptor) => {
                for field in &descriptor.fields {
                    let mut line = format!("  {:<16} {:<8}", field.name, field.ty.name());
                    if field.required {
                        line.push_str(" required");
                    }
                    if !field.aliases.is_empty() {
                        line.push_str(&format!(" aliases: {}", field.aliases.join(", ")));
                    }
                    if let Some(default) = &field.default {
                        line.push_str(&format!(" default: {default}"));
                    }
                    println!("{line}");
                }
                for group in &descriptor.one_of {
                    println!("  exactly one of: {}", group.members.join(", "));
                }
                if descriptor.requires_confirmation {
                    println!("  requires confirm=true");
                }
                CommandResult::Continue
            }
            None => CommandResult::Error(format!("No action '{}' on tool '{}'", action.trim(), tool)),
        }
    }
}

/// Result of handling a command
enum CommandResult {
    Continue,
    Exit,
    Error(String),
}

/// Check if braces and brackets are balanced outside string literals
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("stagehand").join("repl_history"))
}

const WELCOME_MESSAGE: &str = r#"
Stagehand editor tools REPL

  Call a tool:   data_table get_row {"TablePath": "/Game/Data/DT_Items", "RowName": "Sword"}
  Type :help for commands, :tools to see what is available.
"#;

const HELP_MESSAGE: &str = r#"
Commands:
  :help, :h, :?            - Show this help message
  :quit, :q, :exit         - Exit the REPL
  :tools, :t               - List tools
  :actions, :a [tool]      - List actions with their required parameters
  :describe, :d <tool> <action>
                           - Show every parameter of one action
  :history                 - Show committed edits
  :reset                   - Discard all edits and reload the document

Requests:
  <tool> <action> [json params]
  Tool names may drop the manage_ prefix: data_table, level_actors.

Tips:
  - JSON with unbalanced braces continues on the next line
  - Use Ctrl+C to cancel current input, Ctrl+D to exit
"#;

/// Entry point for the REPL command
pub fn run_repl(workspace: Workspace) -> Result<()> {
    let mut repl = Repl::new(workspace)?;
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced(r#"data_table list_rows {"TablePath": "/Game/Data/DT_Items"}"#));
        assert!(!is_balanced(r#"data_table add_rows {"rows": {"#));
        assert!(is_balanced(r#"level_actors find {"ActorName": "brace { in name"}"#));
        assert!(is_balanced(r#"x y {"quote": "escaped \" {"}"#));
        assert!(is_balanced("level_actors list"));
    }
}
