use std::{error::Error as _, path::PathBuf, process::ExitCode};

use clap::Parser;

use amplify_config_hook::{
    hook::{self, AMPLIFY_CONFIG, FORMAT, PREFIX},
    AmplifyConfigHook, Connection, Error, HookArguments, HookError, Region, Resolvable,
    StackContext,
};

/// Generate an Amplify configuration file from deployed Cognito resources.
#[derive(Debug, Parser)]
#[command(name = "amplify-config-hook", version, about)]
struct Args {
    /// Name prefix of the user pool, identity pool and hosted UI domain. May be a deferred
    /// reference such as `!stack_attr parameters.Prefix`.
    #[arg(long)]
    prefix: Option<String>,

    /// File to write the configuration to.
    #[arg(long)]
    amplify_config: Option<PathBuf>,

    /// Output format: `json` (default) or `dart`.
    #[arg(long)]
    format: Option<String>,

    /// Stack configuration (YAML) that `!stack_attr` references resolve against.
    #[arg(long)]
    stack_config: Option<PathBuf>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS shared config profile.
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Override the Cognito endpoint, e.g. for a local emulator.
    #[arg(long)]
    endpoint_url: Option<String>,
}

impl Args {
    fn hook_arguments(&self) -> Result<HookArguments, Error> {
        let mut arguments = HookArguments::new();
        if let Some(prefix) = &self.prefix {
            arguments.insert(PREFIX.to_owned(), prefix.parse::<Resolvable>()?);
        }
        if let Some(path) = &self.amplify_config {
            arguments.insert(
                AMPLIFY_CONFIG.to_owned(),
                hook::output_path(path).map_err(HookError::from)?,
            );
        }
        if let Some(format) = &self.format {
            arguments.insert(FORMAT.to_owned(), Resolvable::literal(format.as_str()));
        }
        Ok(arguments)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            let mut source = error.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PathBuf, Error> {
    let hook = AmplifyConfigHook::new(args.hook_arguments()?);
    hook.validate().map_err(HookError::from)?;

    let mut builder = Connection::builder();
    if let Some(region) = args.region {
        builder = builder.region(Region::new(region));
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    if let Some(endpoint_url) = args.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }
    let connection = builder.build().await?;

    let context = match &args.stack_config {
        Some(path) => StackContext::load(connection, path).await?,
        None => StackContext::without_config(connection),
    };

    Ok(hook.run(&context).await?)
}
