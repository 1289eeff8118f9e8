//! Line-oriented front end over the assistant context.

use std::io::Write;

use milo_assistant::{AssistantContext, ConfirmedAction, RevealSink};
use milo_common::{Conversation, Event, Message, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const HELP: &str = "\
commands:
  /new                 start a new conversation
  /list                show conversation history
  /open <n>            open conversation n from the list
  /rename <n> <title>  rename conversation n
  /delete <n>          delete conversation n (asks first)
  /clear               clear the open conversation (asks first)
  /yes, /no            answer a pending question
  /voice on|off        toggle spoken replies
  /state               dump session state as JSON
  /quit                exit
anything else is sent to MILO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    New,
    List,
    Open(usize),
    Rename(usize, String),
    Delete(usize),
    Clear,
    Yes,
    No,
    Voice(bool),
    State,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Send(line.to_string()));
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        let command = match (name, arg) {
            ("new", _) => Command::New,
            ("list" | "history", _) => Command::List,
            ("open", n) => index_arg(n).map_or_else(usage("/open <n>"), Command::Open),
            ("delete", n) => index_arg(n).map_or_else(usage("/delete <n>"), Command::Delete),
            ("rename", rest) => {
                let (n, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match (index_arg(n), title.trim()) {
                    (Some(n), title) if !title.is_empty() => Command::Rename(n, title.to_string()),
                    _ => usage("/rename <n> <title>")(),
                }
            }
            ("clear", _) => Command::Clear,
            ("yes" | "y", _) => Command::Yes,
            ("no" | "n", _) => Command::No,
            ("voice", "on") => Command::Voice(true),
            ("voice", "off") => Command::Voice(false),
            ("voice", _) => usage("/voice on|off")(),
            ("state", _) => Command::State,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit" | "q", _) => Command::Quit,
            (other, _) => Command::Invalid(format!("unknown command /{other}, try /help")),
        };
        Some(command)
    }
}

/// 1-based list position to index.
fn index_arg(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

fn usage(text: &'static str) -> impl Fn() -> Command {
    move || Command::Invalid(format!("usage: {text}"))
}

/// Writes revealed characters straight to stdout.
struct TerminalSink {
    out: std::io::Stdout,
}

impl RevealSink for TerminalSink {
    fn reveal(&mut self, _visible: &str, ch: char) {
        let _ = write!(self.out, "{ch}");
    }

    fn progress(&mut self, _visible_chars: usize) {
        let _ = self.out.flush();
    }

    fn finished(&mut self, _text: &str) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

pub async fn run(mut ctx: AssistantContext) -> std::io::Result<()> {
    let mut events = ctx.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    ctx.session.load_conversations().await;
    println!("MILO ready. Type a message or /help.");

    loop {
        prompt(&ctx)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        debug!(?command, "repl command");

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Invalid(msg) => println!("{msg}"),
            Command::Send(text) => send(&mut ctx, &mut events, &text).await,
            Command::New => {
                ctx.panel.new_chat(&ctx.session);
                println!("(new conversation)");
            }
            Command::List => {
                ctx.session.load_conversations().await;
                print_conversations(&ctx.session.conversations());
            }
            Command::Open(index) => match pick(&ctx, index) {
                Some(conv) => {
                    match ctx.panel.open_from_history(&ctx.session, &conv.id).await {
                        Ok(()) => {
                            println!("(opened \"{}\")", conv.title);
                            render_all(&ctx, &ctx.session.messages()).await;
                        }
                        Err(e) => println!("error: {e}"),
                    }
                }
                None => println!("no conversation {}", index + 1),
            },
            Command::Rename(index, title) => match pick(&ctx, index) {
                Some(conv) => match ctx.session.rename_conversation(&conv.id, &title).await {
                    Ok(()) => println!("(renamed to \"{title}\")"),
                    Err(e) => println!("error: {e}"),
                },
                None => println!("no conversation {}", index + 1),
            },
            Command::Delete(index) => match pick(&ctx, index) {
                Some(conv) => {
                    ctx.panel.request_delete(conv.id.clone());
                    println!("Delete \"{}\"? /yes or /no", conv.title);
                }
                None => println!("no conversation {}", index + 1),
            },
            Command::Clear => {
                ctx.panel.request_clear();
                println!("Clear the current conversation? /yes or /no");
            }
            Command::Yes => match ctx.panel.confirm(&ctx.session).await {
                Ok(Some(ConfirmedAction::Deleted(_))) => println!("(deleted)"),
                Ok(Some(ConfirmedAction::Cleared)) => println!("(cleared)"),
                Ok(None) => println!("nothing to confirm"),
                Err(e) => println!("error: {e}"),
            },
            Command::No => {
                if ctx.panel.pending().is_some() {
                    ctx.panel.cancel();
                    println!("(cancelled)");
                }
            }
            Command::Voice(on) => {
                ctx.voice.set_enabled(on);
                println!("(voice {})", if on { "on" } else { "off" });
            }
            Command::State => match serde_json::to_string_pretty(&ctx.session.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "failed to serialize session state"),
            },
        }
        drain(&mut ctx, &mut events);
    }

    println!("bye");
    Ok(())
}

async fn send(ctx: &mut AssistantContext, events: &mut broadcast::Receiver<Event>, text: &str) {
    let pending = ctx.session.send_message(text);
    println!("MILO is thinking...");
    let result = pending.await;
    drain(ctx, events);

    match result {
        Ok(Some(_)) => {
            let messages = ctx.session.messages();
            render_latest(ctx, &messages).await;
        }
        Ok(None) => {}
        Err(e) if e.is_user_visible() => {
            let shown = ctx.session.error().unwrap_or_else(|| e.to_string());
            println!("error: {shown}");
        }
        Err(e) => println!("{e}"),
    }
}

fn drain(ctx: &mut AssistantContext, events: &mut broadcast::Receiver<Event>) {
    loop {
        match events.try_recv() {
            Ok(event) => ctx.dispatch(&event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "event receiver lagged");
            }
            Err(_) => break,
        }
    }
}

fn prompt(ctx: &AssistantContext) -> std::io::Result<()> {
    let mut out = std::io::stdout();
    match ctx.panel.pending() {
        Some(_) => write!(out, "confirm? ")?,
        None => match ctx.panel.badge(&ctx.session) {
            Some(count) => write!(out, "[{count}] > ")?,
            None => write!(out, "> ")?,
        },
    }
    out.flush()
}

fn pick(ctx: &AssistantContext, index: usize) -> Option<Conversation> {
    ctx.session.conversations().get(index).cloned()
}

fn print_conversations(list: &[Conversation]) {
    if list.is_empty() {
        println!("(no conversations yet)");
        return;
    }
    for (n, conv) in list.iter().enumerate() {
        let updated = conv.updated_at.with_timezone(&chrono::Local);
        println!(
            "{:>3}. {}  ({})",
            n + 1,
            conv.title,
            updated.format("%Y-%m-%d %H:%M")
        );
    }
}

async fn render_all(ctx: &AssistantContext, messages: &[Message]) {
    for index in 0..messages.len() {
        render_at(ctx, messages, index).await;
    }
}

async fn render_latest(ctx: &AssistantContext, messages: &[Message]) {
    if let Some(index) = messages.len().checked_sub(1) {
        render_at(ctx, messages, index).await;
    }
}

async fn render_at(ctx: &AssistantContext, messages: &[Message], index: usize) {
    let Some(message) = messages.get(index) else {
        return;
    };
    let label = match message.role {
        Role::User => "you",
        Role::Assistant => "milo",
    };
    print!("{label}: ");
    match ctx.reveal.mount(messages, index) {
        Some(typewriter) => {
            let mut sink = TerminalSink {
                out: std::io::stdout(),
            };
            typewriter.run(&mut sink).await;
        }
        None => println!("{}", message.content),
    }
}
