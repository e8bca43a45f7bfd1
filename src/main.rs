// SPDX-License-Identifier: MIT
//
// quire — convert, render and measure rich-text documents.
//
// This is the binary that wires the crates together:
//
//   quire-format → import/export for the seven file formats
//   quire-editor → document model, editor facade, layout, screen
//   quire-term   → cell grid, redraw engine, ANSI terminal
//
// Every document goes through the Editor facade, so opening and saving
// publish the same events an interactive front end would see:
//
//   file → Format::import → Editor::open ─┬─ convert → Format::export → file
//                                         ├─ render  → Screen::draw → stdout
//                                         └─ stats   → Layout pages → stdout

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use quire_editor::editor::Editor;
use quire_editor::layout::Layout;
use quire_editor::options::Options;
use quire_editor::screen::Screen;
use quire_editor::style::StyleRegistry;
use quire_format::Format;
use quire_term::terminal::{self, AnsiTerminal, Terminal};

/// Environment variable holding `:set`-style option directives.
const OPTIONS_ENV: &str = "QUIRE_OPTIONS";

/// Wrap width for page counting when neither `width=` nor a terminal says.
const DEFAULT_WIDTH: u16 = 72;

#[derive(Parser, Debug)]
#[command(name = "quire", version, about = "Convert, render and measure rich-text documents")]
struct Cli {
    /// Option directives, e.g. "width=72 pageheight=60 nostylemargin".
    /// Applied after $QUIRE_OPTIONS.
    #[arg(long = "set", global = true, value_name = "DIRECTIVES")]
    set: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a document from one format to another.
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Input format; defaults to the input's extension.
        #[arg(long)]
        from: Option<Format>,
        /// Output format; defaults to the output's extension.
        #[arg(long)]
        to: Option<Format>,
    },
    /// Lay a document out and draw it to the terminal.
    Render {
        input: PathBuf,
        #[arg(long)]
        from: Option<Format>,
        /// Columns; defaults to the terminal width.
        #[arg(long)]
        width: Option<u16>,
        /// Rows; defaults to the terminal height.
        #[arg(long)]
        height: Option<u16>,
    },
    /// Print paragraph, word, character and page counts.
    Stats {
        input: PathBuf,
        #[arg(long)]
        from: Option<Format>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let options = load_options(&cli.set)?;

    match cli.command {
        Command::Convert { input, output, from, to } => convert(&options, &input, &output, from, to),
        Command::Render {
            input,
            from,
            width,
            height,
        } => render(&options, &input, from, width, height),
        Command::Stats { input, from } => stats(&options, &input, from),
    }
}

/// Defaults, then `$QUIRE_OPTIONS`, then each `--set` in order.
fn load_options(sets: &[String]) -> Result<Options> {
    let mut options = Options::default();
    if let Ok(directives) = env::var(OPTIONS_ENV) {
        options
            .apply_all(&directives)
            .with_context(|| format!("invalid {OPTIONS_ENV}"))?;
    }
    for directives in sets {
        for shown in options
            .apply_all(directives)
            .with_context(|| format!("invalid --set {directives:?}"))?
        {
            println!("{shown}");
        }
    }
    debug!("options: {options:?}");
    Ok(options)
}

/// An editor with `input` opened in it.
fn open(options: &Options, input: &Path, from: Option<Format>) -> Result<Editor> {
    let document = quire_format::read_file(input, from)
        .with_context(|| format!("cannot open {}", input.display()))?;

    let mut editor = Editor::new(StyleRegistry::builtin());
    editor.set_undo_depth(options.undo_levels);
    editor
        .events()
        .subscribe(|event, doc| info!("{event:?} ({} paragraphs)", doc.len()));
    editor.open(document, Some(input.to_path_buf()));
    Ok(editor)
}

fn convert(
    options: &Options,
    input: &Path,
    output: &Path,
    from: Option<Format>,
    to: Option<Format>,
) -> Result<()> {
    let mut editor = open(options, input, from)?;
    quire_format::write_file(editor.document(), editor.styles(), output, to)
        .with_context(|| format!("cannot save {}", output.display()))?;
    editor.mark_saved(output);
    Ok(())
}

fn render(
    options: &Options,
    input: &Path,
    from: Option<Format>,
    width: Option<u16>,
    height: Option<u16>,
) -> Result<()> {
    let editor = open(options, input, from)?;
    let size = terminal::get_size();
    let width = width.or_else(|| size.map(|s| s.cols)).unwrap_or(80);
    let height = height.or_else(|| size.map(|s| s.rows)).unwrap_or(24);
    debug!("rendering at {width}x{height}");

    let mut screen = Screen::new(editor.document(), editor.styles(), options, width, height);
    let mut term = AnsiTerminal::new(io::stdout().lock());
    if terminal::is_tty() {
        term.clear();
    }
    let stats = screen
        .draw(editor.document(), editor.styles(), &mut term)
        .context("cannot draw")?;
    term.move_cursor(height.saturating_sub(1), 0);
    term.flush().context("cannot draw")?;
    debug!("{} cells written", stats.cells_written);

    let mut out = term.into_inner();
    writeln!(out).context("cannot draw")?;
    Ok(())
}

fn stats(options: &Options, input: &Path, from: Option<Format>) -> Result<()> {
    let editor = open(options, input, from)?;
    let doc = editor.document();
    let width = match options.width {
        0 => terminal::get_size().map_or(DEFAULT_WIDTH, |s| s.cols),
        w => w,
    };
    let layout = Layout::new(doc, editor.styles(), width, options.page_height);

    println!("paragraphs {}", doc.len());
    println!("words      {}", doc.word_count());
    println!("chars      {}", doc.char_count());
    println!("lines      {}", layout.line_count());
    println!("pages      {}", layout.page_count());
    Ok(())
}
