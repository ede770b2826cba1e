use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use regpay::application::CheckoutOrchestrator;
use regpay::domain::attempt::CheckoutAttempt;
use regpay::domain::money::Amount;
use regpay::domain::order::{DraftOrder, Participant, PaymentMethod, PaymentReference};
use regpay::domain::ports::{OrderStoreRef, PaymentParams, WalletApproval};
use regpay::infrastructure::in_memory::{InMemoryOrderStore, InMemoryReconciliationQueue};
use regpay::infrastructure::notification::LogNotificationService;
#[cfg(feature = "storage-rocksdb")]
use regpay::infrastructure::rocksdb::RocksDbOrderStore;
use regpay::payment::{CardProcessor, ManualProcessor, SandboxCardGateway, WalletProcessor};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Demo driver: runs one checkout through the orchestrator and prints the
/// finalized order as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Order total
    #[arg(long)]
    total: Decimal,

    /// Processing fees added to the total
    #[arg(long, default_value = "0")]
    fees: Decimal,

    /// Payment method: card, wallet, or manual
    #[arg(long, default_value = "manual")]
    method: String,

    /// Tokenized card for --method card (sandbox gateway; tokens starting
    /// with "decline" or "fault" trigger those outcomes)
    #[arg(long, default_value = "tok_demo")]
    card_token: String,

    /// Participant as name:email (repeatable)
    #[arg(long = "participant")]
    participants: Vec<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn parse_method(value: &str) -> Result<PaymentMethod> {
    match value {
        "card" => Ok(PaymentMethod::Card),
        "wallet" => Ok(PaymentMethod::Wallet),
        "manual" => Ok(PaymentMethod::Manual),
        other => Err(miette!("unknown payment method '{other}'")),
    }
}

fn parse_participant(value: &str) -> Result<Participant> {
    let (name, email) = value
        .split_once(':')
        .ok_or_else(|| miette!("participant must be name:email, got '{value}'"))?;
    Ok(Participant {
        name: name.to_string(),
        email: email.to_string(),
    })
}

fn open_store(db_path: Option<&PathBuf>) -> Result<OrderStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Arc::new(RocksDbOrderStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => Err(miette!(
            "--db-path requires building with the storage-rocksdb feature"
        )),
        None => Ok(Arc::new(InMemoryOrderStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let method = parse_method(&cli.method)?;

    let participants = if cli.participants.is_empty() {
        vec![Participant {
            name: "Demo Attendee".to_string(),
            email: "attendee@example.com".to_string(),
        }]
    } else {
        cli.participants
            .iter()
            .map(|p| parse_participant(p))
            .collect::<Result<Vec<_>>>()?
    };

    let draft = DraftOrder {
        participants,
        total: Amount::new(cli.total).into_diagnostic()?,
        fees: Amount::new(cli.fees).into_diagnostic()?,
    };

    let store = open_store(cli.db_path.as_ref())?;
    let orchestrator = CheckoutOrchestrator::new(
        store,
        Arc::new(LogNotificationService),
        Arc::new(InMemoryReconciliationQueue::new()),
    )
    .with_processor(Arc::new(CardProcessor::new(Arc::new(SandboxCardGateway))))
    .with_processor(Arc::new(WalletProcessor::new()))
    .with_processor(Arc::new(ManualProcessor::new()));

    let params = match method {
        PaymentMethod::Card => PaymentParams::Card {
            token: cli.card_token.clone(),
        },
        PaymentMethod::Wallet => {
            // No real wallet widget in a terminal; approve immediately so
            // the demo completes.
            let (tx, rx) = oneshot::channel();
            let reference = PaymentReference::new("wallet-demo-approval").into_diagnostic()?;
            tx.send(WalletApproval::Approved(reference))
                .map_err(|_| miette!("wallet approval channel closed"))?;
            PaymentParams::Wallet { approval: rx }
        }
        PaymentMethod::Manual => PaymentParams::Manual,
    };

    let mut attempt = CheckoutAttempt::new();
    let order = orchestrator
        .process_checkout(&mut attempt, &draft, method, params)
        .await
        .into_diagnostic()?;

    // Let the receipt dispatch finish before the runtime goes away.
    orchestrator.drain_receipts().await;

    println!(
        "{}",
        serde_json::to_string_pretty(&order).into_diagnostic()?
    );
    Ok(())
}
