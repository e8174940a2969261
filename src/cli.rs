// Command surface: clap definitions, dispatch to the request operations
// and rendering of their results on stdout.

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::geocode::NominatimGeocoder;
use crate::requests::{NewRequest, RequestService};
use crate::session::{self, Session};

/// Command-line client for the delivery platform
#[derive(Parser, Debug)]
#[command(name = "envios")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Session token (defaults to the stored one)
    #[arg(long, env = "ENVIOS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contains various requests subcommands
    Requests(RequestsArgs),

    /// Store a session token for later invocations
    Login {
        #[arg(value_name = "TOKEN")]
        value: String,
    },
}

#[derive(Args, Debug)]
pub struct RequestsArgs {
    /// Run command impersonalized as other user (nickname)
    #[arg(short = 'i', long, default_value = session::SELF_NICKNAME, global = true)]
    pub impersonalize: String,

    #[command(subcommand)]
    pub command: RequestsCommand,
}

#[derive(Subcommand, Debug)]
pub enum RequestsCommand {
    /// Return last requests
    Last {
        /// Timeframe to search last requests
        #[arg(short, long, default_value = "1d")]
        since: String,
    },

    /// Return all requests
    List,

    /// Show a request as returned by the platform
    Show { id: String },

    /// Show request offers
    Offers { id: String },

    /// Show request summary with status and remaining time
    Detail { id: String },

    /// Show shippers available for a request
    Availability { id: String },

    /// Show request price
    Price {
        origin: String,
        destination: String,
        /// bici, auto, miniflete or camion
        vehicle: String,
    },

    /// Create new request
    New {
        description: String,
        origin: String,
        destination: String,
        /// bici, auto, miniflete or camion
        vehicle: String,
        /// "me" or a phone number
        sender: String,
        /// "me" or a phone number
        receiver: String,
    },
}

pub fn execute(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Login { value } => {
            let path = session::token_path();
            session::persist_token(&path, value)?;
            tracing::info!(path = %path.display(), "token stored");
            render(&json!({ "token_file": path.display().to_string() }), cli.pretty)
        }
        Commands::Requests(args) => {
            let session = Session::resolve(
                cli.token.as_deref(),
                &session::token_path(),
                &args.impersonalize,
            )?;
            let service = RequestService::new(
                ApiClient::new(config, session)?,
                NominatimGeocoder::new(config)?,
            );
            run_requests(&service, &args.command, cli.pretty)
        }
    }
}

fn run_requests(
    service: &RequestService<ApiClient, NominatimGeocoder>,
    command: &RequestsCommand,
    pretty: bool,
) -> Result<()> {
    match command {
        RequestsCommand::Last { since } => render(&service.last(since)?, pretty),
        RequestsCommand::List => render(&service.list()?, pretty),
        RequestsCommand::Show { id } => render(&service.show(id)?, pretty),
        RequestsCommand::Offers { id } => render(&service.offers(id)?, pretty),
        RequestsCommand::Detail { id } => render(&service.detail(id)?, pretty),
        RequestsCommand::Availability { id } => render(&service.availability(id)?, pretty),
        RequestsCommand::Price {
            origin,
            destination,
            vehicle,
        } => render(&service.price(origin, destination, vehicle)?, pretty),
        RequestsCommand::New {
            description,
            origin,
            destination,
            vehicle,
            sender,
            receiver,
        } => {
            let args = NewRequest {
                description: description.clone(),
                origin: origin.clone(),
                destination: destination.clone(),
                vehicle: vehicle.clone(),
                sender: sender.clone(),
                receiver: receiver.clone(),
            };
            render(&service.create(&args)?, pretty)
        }
    }
}

/// Print one JSON value on stdout.
pub fn render<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", to_json(value, pretty)?);
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.map_err(|source| ClientError::Encode {
        what: "output".into(),
        source,
    })
}
