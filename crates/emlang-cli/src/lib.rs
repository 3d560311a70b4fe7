//! CLI logic for the Emlang event modeling tool.
//!
//! This module contains the core CLI logic: reading inputs, loading
//! configuration and dispatching each subcommand to the library or to one
//! of the preview servers.

pub mod config;
pub mod error_adapter;

mod args;
mod serve;

pub use args::{Args, Command};

use std::{
    fs,
    io::{self, Read, Write},
};

use log::{debug, info};

use emlang::{
    Document, DocumentBuilder, EmlangError, Element, Slice, Test,
    config::{AppConfig, FmtConfig},
    format::KeyStyle,
    lint::Issue,
};

/// Input path that reads standard input.
const STDIN: &str = "-";

const SEPARATOR: &str = "----------------------------------------";

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command completed but found error-severity issues.
    Failure,
}

/// Run the Emlang CLI application
///
/// Command output goes to `out`; files are written only by `fmt -w`,
/// `diagram -o` and `init`. `diagram --serve` and `repl` block until the
/// process receives Ctrl+C.
///
/// # Errors
///
/// Returns `EmlangError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
pub fn run(args: &Args, out: &mut impl Write) -> Result<Outcome, EmlangError> {
    if let Command::Init { path } = &args.command {
        config::write_default_config(path)?;
        writeln!(out, "Created {path}")?;
        return Ok(Outcome::Success);
    }

    let app_config = config::load_config(args.config.as_deref())?;

    let outcome = match &args.command {
        Command::Parse { input } => parse(input, app_config, out)?,
        Command::Lint { input } => lint(input, app_config, out)?,
        Command::Fmt { write, keys, input } => fmt(input, *write, *keys, app_config, out)?,
        Command::Diagram {
            serve: true,
            address,
            port,
            input,
            ..
        } => serve_diagram(input, address.as_deref(), *port, app_config, out)?,
        Command::Diagram { output, input, .. } => {
            diagram(input, output.as_deref(), app_config, out)?
        }
        Command::Repl {
            address,
            port,
            input,
        } => repl(input.as_deref(), address.as_deref(), *port, app_config, out)?,
        Command::Init { .. } => Outcome::Success,
    };
    out.flush()?;
    Ok(outcome)
}

/// Read an input argument, returning its display name and contents.
fn read_input(input: &str) -> Result<(String, String), EmlangError> {
    if input == STDIN {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(("<stdin>".to_string(), source));
    }

    let source = fs::read_to_string(input)?;
    Ok((input.to_string(), source))
}

fn load(input: &str, builder: &DocumentBuilder) -> Result<(String, Document), EmlangError> {
    let (name, source) = read_input(input)?;
    info!(input = name; "Processing model");
    let document = builder.parse(&source)?;
    Ok((name, document))
}

fn parse(input: &str, config: AppConfig, out: &mut impl Write) -> Result<Outcome, EmlangError> {
    let builder = DocumentBuilder::new(config);
    let (name, document) = load(input, &builder)?;

    writeln!(out, "Parsed {name} successfully")?;
    writeln!(out, "{SEPARATOR}")?;
    write_summary(out, &document)?;
    Ok(Outcome::Success)
}

fn lint(input: &str, config: AppConfig, out: &mut impl Write) -> Result<Outcome, EmlangError> {
    let builder = DocumentBuilder::new(config);
    let (name, document) = load(input, &builder)?;
    let issues = builder.lint(&document);

    if issues.is_empty() {
        writeln!(out, "{name}: OK (no issues found)")?;
        return Ok(Outcome::Success);
    }

    let errors = issues
        .iter()
        .filter(|issue| issue.severity().is_error())
        .count();
    let warnings = issues.len() - errors;
    debug!(errors = errors, warnings = warnings; "Lint issues found");

    writeln!(out, "{name}: {} issue(s) found", issues.len())?;
    writeln!(out, "{SEPARATOR}")?;
    for issue in &issues {
        write_issue(out, &name, issue)?;
    }
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "Summary: {errors} error(s), {warnings} warning(s)")?;

    if errors > 0 {
        Ok(Outcome::Failure)
    } else {
        Ok(Outcome::Success)
    }
}

fn write_issue(out: &mut impl Write, name: &str, issue: &Issue) -> io::Result<()> {
    writeln!(
        out,
        "{name}:{}:{}: {}: {} [{}]",
        issue.line(),
        issue.column(),
        issue.severity(),
        issue.message(),
        issue.rule()
    )
}

fn fmt(
    input: &str,
    write: bool,
    keys: Option<KeyStyle>,
    config: AppConfig,
    out: &mut impl Write,
) -> Result<Outcome, EmlangError> {
    if write && input == STDIN {
        return Err(EmlangError::Config(
            "-w cannot be used with standard input".to_string(),
        ));
    }

    // Flag wins over configuration
    let config = match keys {
        Some(keys) => AppConfig::new(
            config.lint().clone(),
            FmtConfig::new(keys),
            config.diagram().clone(),
        ),
        None => config,
    };
    let builder = DocumentBuilder::new(config);
    let (_, document) = load(input, &builder)?;
    let formatted = builder.format(&document);

    if write {
        fs::write(input, formatted)?;
        info!(path = input; "Formatted file in place");
    } else {
        out.write_all(formatted.as_bytes())?;
    }
    Ok(Outcome::Success)
}

fn diagram(
    input: &str,
    output: Option<&str>,
    config: AppConfig,
    out: &mut impl Write,
) -> Result<Outcome, EmlangError> {
    let builder = DocumentBuilder::new(config);
    let (_, document) = load(input, &builder)?;
    let html = builder.render_html(&document);

    match output {
        Some(path) => {
            fs::write(path, html)?;
            info!(output_file = path; "HTML diagram exported successfully");
        }
        None => out.write_all(html.as_bytes())?,
    }
    Ok(Outcome::Success)
}

fn serve_diagram(
    input: &str,
    address: Option<&str>,
    port: Option<u16>,
    config: AppConfig,
    out: &mut impl Write,
) -> Result<Outcome, EmlangError> {
    if input == STDIN {
        return Err(EmlangError::Config(
            "--serve cannot be used with standard input".to_string(),
        ));
    }

    let listen = serve::Listen::resolve(
        address,
        port,
        config.diagram().serve(),
        serve::live::DEFAULT_PORT,
    );
    serve::live::serve(input, &listen, DocumentBuilder::new(config), out)?;
    Ok(Outcome::Success)
}

fn repl(
    input: Option<&str>,
    address: Option<&str>,
    port: Option<u16>,
    config: AppConfig,
    out: &mut impl Write,
) -> Result<Outcome, EmlangError> {
    let listen = serve::Listen::resolve(address, port, config.repl(), serve::repl::DEFAULT_PORT);
    serve::repl::serve(input, &listen, DocumentBuilder::new(config), out)?;
    Ok(Outcome::Success)
}

fn write_summary(out: &mut impl Write, document: &Document) -> io::Result<()> {
    writeln!(out, "Document with {} slice(s)", document.slices().len())?;

    for slice in document.sub_docs().iter().flat_map(|sub_doc| sub_doc.slices()) {
        writeln!(out)?;
        write_slice(out, slice)?;
    }
    Ok(())
}

fn write_slice(out: &mut impl Write, slice: &Slice) -> io::Result<()> {
    let name = match slice.name() {
        "" => "(anonymous)",
        name => name,
    };
    writeln!(out, "Slice: {name}")?;
    writeln!(out, "  {} element(s)", slice.elements().len())?;
    for element in slice.elements() {
        write_element(out, "    ", element)?;
    }

    if slice.has_tests() {
        writeln!(out, "  {} attached test(s)", slice.tests().len())?;
        for test in slice.tests().values() {
            write_test(out, test)?;
        }
    }
    Ok(())
}

fn write_test(out: &mut impl Write, test: &Test) -> io::Result<()> {
    writeln!(out, "  Test: {}", test.name())?;

    let sections = [
        ("Given", test.given()),
        ("When", test.when()),
        ("Then", test.then()),
    ];
    for (label, elements) in sections {
        if elements.is_empty() {
            continue;
        }
        writeln!(out, "    {label}: {} element(s)", elements.len())?;
        for element in elements {
            write_element(out, "      ", element)?;
        }
    }
    Ok(())
}

fn write_element(out: &mut impl Write, indent: &str, element: &Element) -> io::Result<()> {
    writeln!(
        out,
        "{indent}{}: {}",
        element.element_type(),
        element.qualified_name()
    )?;

    if !element.props().is_empty() {
        writeln!(out, "{indent}  props:")?;
        for entry in element.props() {
            writeln!(out, "{indent}    {}: {}", entry.key(), entry.value())?;
        }
    }
    Ok(())
}
