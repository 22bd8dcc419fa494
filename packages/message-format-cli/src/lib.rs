//! Message Format CLI
//!
//! Command logic behind `msgc`: loading JSON message tables, packing and
//! unpacking bundles, formatting single messages and checking templates.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use message_format::pack::PACK_MAGIC;
use message_format::{
    Locale, MessageBundle, MessageConfig, MessageContext, MessageParserError, PackOptions,
    ParameterMap, TableRow, Value,
};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

/// Installs the stderr logger. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Builds a context from an optional JSON config file.
pub fn load_context(config: Option<&Path>) -> Result<MessageContext> {
    let config = match config {
        Some(path) => MessageConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MessageConfig::default(),
    };
    Ok(MessageContext::new(config)?)
}

/// Reads a table of the form `{ "CODE": { "locale": "template", ... }, ... }`.
/// The empty locale tag is the root variant.
pub fn parse_table(json: &str) -> Result<Vec<TableRow>> {
    let table: IndexMap<String, IndexMap<String, String>> =
        serde_json::from_str(json).context("malformed message table")?;

    let mut rows = Vec::new();
    for (code, variants) in table {
        if variants.is_empty() {
            bail!("message '{code}' has no templates");
        }
        for (tag, template) in variants {
            let locale = Locale::parse(&tag).with_context(|| format!("message '{code}'"))?;
            rows.push(TableRow::new(code.clone(), locale, template));
        }
    }
    Ok(rows)
}

pub fn read_table(path: &Path) -> Result<Vec<TableRow>> {
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_table(&json).with_context(|| format!("in {}", path.display()))
}

/// Loads a bundle from a packed file or a JSON table, told apart by the pack magic.
pub fn load_bundle(context: &MessageContext, path: &Path) -> Result<MessageBundle> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    if bytes.starts_with(PACK_MAGIC) {
        debug!(path = %path.display(), "reading packed bundle");
        return MessageBundle::unpack(bytes.as_slice())
            .with_context(|| format!("failed to unpack {}", path.display()));
    }

    let json = String::from_utf8(bytes).with_context(|| format!("{} is neither a pack nor UTF-8", path.display()))?;
    let rows = parse_table(&json).with_context(|| format!("in {}", path.display()))?;
    MessageBundle::compile_table(context, rows).with_context(|| format!("failed to compile {}", path.display()))
}

/// Compiles a table and writes the packed bundle. Returns the number of messages.
pub fn pack_table(context: &MessageContext, table: &Path, output: &Path, compress: bool) -> Result<usize> {
    let rows = read_table(table)?;
    let bundle = MessageBundle::compile_table(context, rows)
        .with_context(|| format!("failed to compile {}", table.display()))?;

    let options = PackOptions {
        compress: compress || context.config().compress_packs,
    };
    let file = fs::File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    bundle.pack(options, file)?;

    info!(messages = bundle.len(), output = %output.display(), "packed bundle");
    Ok(bundle.len())
}

/// Lists code, locales and parameter names of every packed message.
pub fn describe_pack(context: &MessageContext, input: &Path, out: &mut dyn Write) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let bundle = MessageBundle::unpack(bytes.as_slice())
        .with_context(|| format!("failed to unpack {}", input.display()))?;

    for (code, message) in bundle.iter() {
        let locales: Vec<String> = message
            .locales()
            .iter()
            .map(|locale| if locale.is_root() { "root".to_string() } else { locale.to_string() })
            .collect();
        let parameters: Vec<String> = context.parameter_names(message).into_iter().collect();

        writeln!(out, "{code}")?;
        if !locales.is_empty() {
            writeln!(out, "  locales:    {}", locales.join(", "))?;
        }
        writeln!(out, "  parameters: {}", parameters.join(", "))?;
    }
    Ok(())
}

/// Parses a `name=value` assignment. Values read as integer, decimal or boolean
/// where possible and as string otherwise.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = assignment.split_once('=') else {
        bail!("expected name=value, got '{assignment}'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing parameter name in '{assignment}'");
    }

    let value = if let Ok(n) = raw.parse::<i64>() {
        Value::from(n)
    } else if let Ok(d) = raw.parse::<f64>() {
        Value::from(d)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::from(b)
    } else {
        Value::from(raw)
    };
    Ok((name.to_string(), value))
}

pub fn format_message(
    context: &MessageContext,
    bundle: &MessageBundle,
    code: &str,
    locale: Option<&str>,
    assignments: &[String],
) -> Result<String> {
    let locale = match locale {
        Some(tag) => Locale::parse(tag)?,
        None => Locale::default(),
    };

    let mut parameters = ParameterMap::new(locale);
    for assignment in assignments {
        let (name, value) = parse_assignment(assignment)?;
        parameters.insert(&name, value);
    }

    Ok(bundle.format(context, code, &parameters)?)
}

/// Parses every template of a table, collecting all syntax errors.
pub fn check_table(context: &MessageContext, rows: &[TableRow]) -> Vec<MessageParserError> {
    rows.iter()
        .filter_map(|row| {
            context
                .parse_with_code(&row.code, &row.template)
                .err()
                .map(|e| e.with_locale(row.locale.clone()))
        })
        .collect()
}
