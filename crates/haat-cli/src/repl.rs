//! Interactive search REPL.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow, bail};
use colored::Colorize;
use haat_application::{DispatchOutcome, RendererEvent};
use haat_core::search::{Availability, Filters, VoiceLanguage};
use haat_core::visibility::PointerEvent;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::adapters::read_image;
use crate::bootstrap::App;
use crate::render::print_view;

const COMMANDS: &[&str] = &[
    "/voice", "/image", "/qr", "/open", "/pick", "/trending", "/filters", "/lang", "/click",
    "/clear", "/esc", "/focus", "/show", "/help", "/quit",
];

const HELP: &str = "\
  <text>             submit a search (page names navigate directly)
  ?<text>            type without submitting; shows suggestions
  /pick <n>          choose suggestion n
  /open <n>          open result n
  /trending <n>      search trending term n
  /voice <file>      record from an audio file and search by voice
  /image <file>      visual search with a photo
  /qr <file>         search by QR code image
  /filters [k=v..]   toggle the filter panel, or apply filters
                     keys: price_min price_max location rating free_shipping
                           cod category brand vendor_type availability
  /lang <bn|en>      voice search language
  /click <id>        simulate a click on element <id> (outside closes panels)
  /clear  /esc  /focus  /show  /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Type(String),
    Submit(String),
    Voice(PathBuf),
    Image(PathBuf),
    Qr(PathBuf),
    Open(usize),
    Pick(usize),
    Trending(usize),
    /// `None` toggles the panel.
    Filters(Option<Filters>),
    Lang(VoiceLanguage),
    Click(String),
    Clear,
    Escape,
    Focus,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ReplCommand> {
    let line = line.trim();
    if let Some(partial) = line.strip_prefix('?') {
        return Ok(ReplCommand::Type(partial.to_string()));
    }
    if !line.starts_with('/') {
        return Ok(ReplCommand::Submit(line.to_string()));
    }

    let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args = args.trim();

    let command = match name {
        "/voice" => ReplCommand::Voice(required_path(args)?),
        "/image" => ReplCommand::Image(required_path(args)?),
        "/qr" => ReplCommand::Qr(required_path(args)?),
        "/open" => ReplCommand::Open(index(args)?),
        "/pick" => ReplCommand::Pick(index(args)?),
        "/trending" => ReplCommand::Trending(index(args)?),
        "/filters" if args.is_empty() => ReplCommand::Filters(None),
        "/filters" => ReplCommand::Filters(Some(parse_filters(args)?)),
        "/lang" => ReplCommand::Lang(
            args.parse()
                .map_err(|_| anyhow!("unknown language {:?}; use bn or en", args))?,
        ),
        "/click" if !args.is_empty() => ReplCommand::Click(args.to_string()),
        "/clear" => ReplCommand::Clear,
        "/esc" => ReplCommand::Escape,
        "/focus" => ReplCommand::Focus,
        "/show" => ReplCommand::Show,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        _ => bail!("unknown command {}; try /help", name),
    };
    Ok(command)
}

fn required_path(args: &str) -> Result<PathBuf> {
    if args.is_empty() {
        bail!("a file path is required");
    }
    Ok(PathBuf::from(args))
}

/// 1-based list index.
fn index(args: &str) -> Result<usize> {
    match args.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("expected a positive number, got {:?}", args),
    }
}

pub fn parse_filters(args: &str) -> Result<Filters> {
    let mut filters = Filters::default();
    for pair in args.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got {:?}", pair))?;
        match key {
            "price_min" => filters.price_min = Some(value.parse().context("price_min")?),
            "price_max" => filters.price_max = Some(value.parse().context("price_max")?),
            "rating" => filters.rating = Some(value.parse().context("rating")?),
            "free_shipping" => filters.free_shipping = Some(value.parse().context("free_shipping")?),
            "cod" => filters.cod_available = Some(value.parse().context("cod")?),
            "location" => filters.location = Some(value.to_string()),
            "category" => filters.category = Some(value.to_string()),
            "brand" => filters.brand = Some(value.to_string()),
            "vendor_type" => filters.vendor_type = Some(value.to_string()),
            "availability" => {
                for option in value.split(',') {
                    let option: Availability = option
                        .parse()
                        .map_err(|_| anyhow!("unknown availability {:?}", option))?;
                    filters.availability.insert(option);
                }
            }
            _ => bail!("unknown filter {:?}", key),
        }
    }
    Ok(filters)
}

/// Rustyline helper: command completion, hints and highlighting.
struct ReplHelper;

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else if line.starts_with('?') {
            Owned(line.bright_black().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ReplHelper {}

pub async fn run(app: &App) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper));

    println!("{}", "=== HAAT search ===".bright_magenta().bold());
    println!(
        "{}",
        "Type to search, ?text for suggestions, /help for commands.".bright_black()
    );
    print_view(&app.search.view());

    loop {
        match rl.readline("search> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_command(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(app, command).await {
                            eprintln!("{}", format!("Error: {:#}", e).red());
                        }
                    }
                    Err(e) => eprintln!("{}", e.to_string().yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                app.search.on_escape();
                println!("{}", "CTRL-C: panels closed. Type /quit to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    app.search.unmount().await;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn execute(app: &App, command: ReplCommand) -> Result<()> {
    let search = &app.search;

    match command {
        ReplCommand::Type(text) => search.on_query_change(&text).await,
        ReplCommand::Submit(text) => report(search.submit(&text).await),
        ReplCommand::Voice(path) => {
            app.audio.arm(path);
            if let Err(e) = search.start_recording().await {
                // The alert is rendered from the view.
                tracing::debug!("Recording not started: {}", e);
            } else {
                print_view(&search.view());
                report(search.stop_recording().await);
            }
        }
        ReplCommand::Image(path) => {
            let image = read_image(&path).await?;
            report(search.on_image_selected(image).await);
        }
        ReplCommand::Qr(path) => {
            let image = read_image(&path).await?;
            report(search.on_qr_selected(image).await);
        }
        ReplCommand::Open(n) => {
            let result = search
                .view()
                .results
                .into_iter()
                .nth(n - 1)
                .ok_or_else(|| anyhow!("no result #{}", n))?;
            report(
                search
                    .handle_renderer_event(RendererEvent::ResultClick(result))
                    .await,
            );
        }
        ReplCommand::Pick(n) => {
            let item = search
                .view()
                .suggestions
                .into_iter()
                .nth(n - 1)
                .ok_or_else(|| anyhow!("no suggestion #{}", n))?;
            report(
                search
                    .handle_renderer_event(RendererEvent::SuggestionClick(item))
                    .await,
            );
        }
        ReplCommand::Trending(n) => {
            let term = app
                .config
                .trending_terms
                .get(n - 1)
                .cloned()
                .ok_or_else(|| anyhow!("no trending term #{}", n))?;
            report(
                search
                    .handle_renderer_event(RendererEvent::TrendingClick(term))
                    .await,
            );
        }
        ReplCommand::Filters(None) => search.toggle_filters(),
        ReplCommand::Filters(Some(filters)) => report(
            search
                .handle_renderer_event(RendererEvent::FiltersApply(filters))
                .await,
        ),
        ReplCommand::Lang(language) => {
            search.set_voice_language(language);
            println!("{} {}", "voice language:".bright_black(), language.locale());
        }
        ReplCommand::Click(id) => {
            app.listeners
                .dispatch_click(&PointerEvent::new([id.as_str(), "body"]));
        }
        ReplCommand::Clear => search.clear(),
        ReplCommand::Escape => search.on_escape(),
        ReplCommand::Focus => search.on_focus(),
        ReplCommand::Show => {}
        ReplCommand::Help => {
            println!("{}", HELP.bright_black());
            return Ok(());
        }
        ReplCommand::Quit => return Ok(()),
    }

    print_view(&search.view());
    Ok(())
}

fn report(outcome: DispatchOutcome) {
    match outcome {
        DispatchOutcome::Results(count) => {
            println!("{}", format!("{} results", count).bright_black())
        }
        DispatchOutcome::Ignored => println!("{}", "nothing to search".bright_black()),
        DispatchOutcome::Superseded => println!("{}", "superseded by a newer search".bright_black()),
        DispatchOutcome::Failed(_) | DispatchOutcome::Navigated(_) => {}
    }
}
