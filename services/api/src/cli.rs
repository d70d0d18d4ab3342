use crate::demo::{
    run_advice, run_claims, run_demo, run_premium, run_probability, run_renewal, AdviceArgs,
    ClaimsArgs, DemoArgs, PremiumArgs, ProbabilityArgs, RenewalArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use insurance_agent::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Smart Insurance Agent",
    about = "Run the insurance agent service or its calculators from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price a policy from risk factors and the detected location
    Premium(PremiumArgs),
    /// Look up the status of a claim
    Claims(ClaimsArgs),
    /// Check how long a policy has before it expires
    Renewal(RenewalArgs),
    /// Estimate the chance of a claim in the next policy year
    Probability(ProbabilityArgs),
    /// Ask the text-generation service for a quote and advice on it
    Advice(AdviceArgs),
    /// Run every calculator once with sample inputs
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Premium(args) => run_premium(args).await,
        Command::Claims(args) => run_claims(args),
        Command::Renewal(args) => run_renewal(args),
        Command::Probability(args) => run_probability(args),
        Command::Advice(args) => run_advice(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["insurance-agent-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn premium_flags_parse() {
        let cli = Cli::try_parse_from([
            "insurance-agent-api",
            "premium",
            "--age",
            "30",
            "--vehicle-type",
            "suv",
            "--coverage-amount",
            "25000",
            "--city",
            "Pune",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Premium(args)) => {
                assert_eq!(args.age, 30);
                assert_eq!(args.city.as_deref(), Some("Pune"));
                assert!(!args.offline);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn renewal_rejects_malformed_today() {
        let result = Cli::try_parse_from([
            "insurance-agent-api",
            "renewal",
            "--policy-id",
            "POL-1",
            "--expiry-date",
            "2025-04-15",
            "--current-premium",
            "5000",
            "--today",
            "15/04/2025",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn claims_takes_positional_id() {
        let cli = Cli::try_parse_from(["insurance-agent-api", "claims", "C123"]).expect("parses");
        match cli.command {
            Some(Command::Claims(args)) => assert_eq!(args.claim_id, "C123"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
