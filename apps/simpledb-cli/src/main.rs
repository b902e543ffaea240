//! `sdb`: command-line access to SimpleDB.
//!
//! Credentials come from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`; the
//! other `SDB_*` variables understood by [`ClientConfig::from_env`] apply as
//! well, with `--host` and `--format` taking precedence.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use simpledb_auth::ParameterMap;
use simpledb_client::{ClientConfig, Response, ResultFormat, SimpleDbClient};
use simpledb_model::{
    CreateDomainInput, DeletableAttribute, DeleteAttributesInput, DeleteDomainInput,
    DomainMetadataInput, GetAttributesInput, ListDomainsInput, PutAttributesInput, RawInput,
    ReplaceableAttribute, SelectInput, SimpleDbOperation,
};
use simpledb_xml::ParseNode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sdb", author, version, about = "Amazon SimpleDB command-line client")]
struct Cli {
    /// How to print responses.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Endpoint host (overrides `SDB_HOST`).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Raw,
    Xml,
    Json,
}

impl From<OutputFormat> for ResultFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Raw => Self::Raw,
            OutputFormat::Xml => Self::Xml,
            OutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the domains of the account.
    ListDomains {
        /// Page size.
        #[arg(long)]
        max: Option<u32>,
        /// Continuation token from a previous page.
        #[arg(long)]
        next_token: Option<String>,
    },
    /// Create a domain.
    CreateDomain { domain: String },
    /// Delete a domain and everything in it.
    DeleteDomain { domain: String },
    /// Show a domain's item and attribute counts.
    DomainMetadata { domain: String },
    /// Run a select expression.
    Select {
        expression: String,
        /// Continuation token from a previous page.
        #[arg(long)]
        next_token: Option<String>,
        /// Read the latest committed data.
        #[arg(long)]
        consistent: bool,
    },
    /// Read the attributes of an item.
    GetAttributes {
        domain: String,
        item: String,
        /// Attributes to return (all when omitted).
        names: Vec<String>,
        /// Read the latest committed data.
        #[arg(long)]
        consistent: bool,
    },
    /// Write `name=value` attributes to an item.
    PutAttributes {
        domain: String,
        item: String,
        #[arg(required = true, value_parser = parse_pair)]
        attributes: Vec<(String, String)>,
        /// Replace existing values instead of adding to them.
        #[arg(long)]
        replace: bool,
    },
    /// Delete attributes (`name` or `name=value`), or the whole item.
    DeleteAttributes {
        domain: String,
        item: String,
        attributes: Vec<String>,
    },
    /// Print a signed URL for an action without sending it.
    Sign {
        action: String,
        #[arg(value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected name=value, got {s:?}"))
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("failed to load client configuration")?;
    if let Some(host) = &cli.host {
        config.host.clone_from(host);
    }
    if let Some(format) = cli.format {
        config.result_format = format.into();
    }
    Ok(config)
}

fn deletable(spec: &str) -> DeletableAttribute {
    match spec.split_once('=') {
        Some((name, value)) => DeletableAttribute::single(name, value),
        None => DeletableAttribute::all(spec),
    }
}

async fn run(client: &SimpleDbClient, command: Command) -> Result<Option<Response>> {
    let response = match command {
        Command::ListDomains { max, next_token } => {
            let input = ListDomainsInput {
                max_number_of_domains: max,
                next_token,
            };
            client.list_domains(&input).await?
        }
        Command::CreateDomain { domain } => {
            let input = CreateDomainInput::builder().domain_name(domain).build();
            client.create_domain(&input).await?
        }
        Command::DeleteDomain { domain } => {
            let input = DeleteDomainInput::builder().domain_name(domain).build();
            client.delete_domain(&input).await?
        }
        Command::DomainMetadata { domain } => {
            let input = DomainMetadataInput::builder().domain_name(domain).build();
            client.domain_metadata(&input).await?
        }
        Command::Select {
            expression,
            next_token,
            consistent,
        } => {
            let input = SelectInput {
                select_expression: expression,
                next_token,
                consistent_read: consistent,
            };
            client.select(&input).await?
        }
        Command::GetAttributes {
            domain,
            item,
            names,
            consistent,
        } => {
            let input = GetAttributesInput::builder()
                .domain_name(domain)
                .item_name(item)
                .attribute_names(names)
                .consistent_read(consistent)
                .build();
            client.get_attributes(&input).await?
        }
        Command::PutAttributes {
            domain,
            item,
            attributes,
            replace,
        } => {
            let attributes = attributes
                .into_iter()
                .map(|(name, value)| {
                    if replace {
                        ReplaceableAttribute::replacing(name, value)
                    } else {
                        ReplaceableAttribute::new(name, value)
                    }
                })
                .collect();
            let input = PutAttributesInput::builder()
                .domain_name(domain)
                .item_name(item)
                .attributes(attributes)
                .build();
            client.put_attributes(&input).await?
        }
        Command::DeleteAttributes {
            domain,
            item,
            attributes,
        } => {
            let input = DeleteAttributesInput::builder()
                .domain_name(domain)
                .item_name(item)
                .attributes(attributes.iter().map(String::as_str).map(deletable).collect())
                .build();
            client.delete_attributes(&input).await?
        }
        Command::Sign { action, params } => {
            let Some(operation) = SimpleDbOperation::from_name(&action) else {
                bail!("unknown action: {action}");
            };
            let input = RawInput {
                operation,
                params: params.into_iter().collect::<ParameterMap>(),
            };
            println!("{}", client.signed_url(&input, chrono::Utc::now())?);
            return Ok(None);
        }
    };
    Ok(Some(response))
}

/// Indented outline of a parsed tree, one element per line.
fn render_tree(node: &ParseNode) -> String {
    let mut out = String::new();
    render_node(node, 0, &mut out);
    out
}

fn render_node(node: &ParseNode, depth: usize, out: &mut String) {
    out.push_str(&" ".repeat(depth * 2));
    out.push_str(&node.name);
    for (name, value) in &node.attributes {
        out.push_str(&format!(" {name}={value:?}"));
    }
    if !node.text.is_empty() {
        out.push_str(": ");
        out.push_str(&node.text);
    }
    out.push('\n');
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

fn print_response(response: &Response) -> Result<()> {
    match response {
        Response::Raw(body) => println!("{body}"),
        Response::Xml(root) => print!("{}", render_tree(root)),
        Response::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = build_config(&cli)?;
    debug!(?config, "Loaded client configuration");
    let client = SimpleDbClient::new(config).context("failed to build SimpleDB client")?;

    if let Some(response) = run(&client, cli.command).await? {
        print_response(&response)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_name_value_pairs() {
        assert_eq!(
            parse_pair("color=red").unwrap(),
            ("color".to_owned(), "red".to_owned())
        );
        assert_eq!(parse_pair("expr=a=b").unwrap().1, "a=b");
        assert!(parse_pair("color").is_err());
    }

    #[test]
    fn test_should_parse_put_attributes_command() {
        let cli = Cli::try_parse_from([
            "sdb",
            "--format",
            "json",
            "put-attributes",
            "users",
            "u1",
            "color=red",
            "size=L",
            "--replace",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        let Command::PutAttributes {
            attributes,
            replace,
            ..
        } = cli.command
        else {
            panic!("expected put-attributes");
        };
        assert!(replace);
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn test_should_reject_put_attributes_without_pairs() {
        assert!(Cli::try_parse_from(["sdb", "put-attributes", "users", "u1"]).is_err());
        assert!(Cli::try_parse_from(["sdb", "put-attributes", "users", "u1", "oops"]).is_err());
    }

    #[test]
    fn test_should_map_delete_specs() {
        assert_eq!(deletable("color"), DeletableAttribute::all("color"));
        assert_eq!(deletable("color=red"), DeletableAttribute::single("color", "red"));
    }

    #[test]
    fn test_should_render_tree_outline() {
        let root = ParseNode::new("R")
            .with_attribute("id", "1")
            .with_child(ParseNode::leaf("A", "x"))
            .with_child(ParseNode::new("B").with_child(ParseNode::leaf("C", "y")));
        assert_eq!(render_tree(&root), "R id=\"1\"\n  A: x\n  B\n    C: y\n");
    }
}
