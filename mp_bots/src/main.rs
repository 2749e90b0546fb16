//! Headless self-play driver.
//!
//! A simulated participant plays a run of hands against the house through
//! the session registry, and the run is summarized at the end.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Error, bail};
use ctrlc::set_handler;
use log::{debug, info, warn};
use micro_poker::{
    TableConfig, TableManager,
    bot::{OpponentDecisionMaker, Personality, decision::DecisionContext},
    entities::{Chips, HandResult, HandView, UserId},
    wallet::{Ledger, WalletManager},
};
use pico_args::Arguments;
use rand::{SeedableRng, rngs::StdRng};

const HELP: &str = "\
Play heads-up hands against the house and report the results

USAGE:
  mp_bots [OPTIONS]

OPTIONS:
  --hands      N           Hands to play               [default: 100]
  --wager      CHIPS       Big blind for every hand    [default: 20]
  --player     ID          Participant id              [default: 1]
  --style      NAME        aggressive, passive, or cautious  [default: passive]
  --seed       N           Seed for reproducible runs

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  MP_STARTING_BALANCE      Balance of a participant the ledger hasn't seen
  MP_MAX_BET_MULTIPLIER    Per-street max, in big blinds
  MP_MAX_RAISES            Raises allowed per street
  (See TableConfig::from_env for all configuration options)
";

struct Args {
    hands: usize,
    wager: Chips,
    player: UserId,
    style: Personality,
    seed: Option<u64>,
}

#[derive(Debug, Default)]
struct Tally {
    played: usize,
    won: usize,
    lost: usize,
    split: usize,
    refunded: usize,
}

impl Tally {
    /// Count a finished hand from seat 0's point of view.
    fn record(&mut self, view: &HandView) {
        self.played += 1;
        match &view.result {
            Some(HandResult::Showdown { payouts, .. }) => match payouts[0].cmp(&payouts[1]) {
                std::cmp::Ordering::Greater => self.won += 1,
                std::cmp::Ordering::Less => self.lost += 1,
                std::cmp::Ordering::Equal => self.split += 1,
            },
            Some(HandResult::Fold { winner: 0, .. }) => self.won += 1,
            Some(HandResult::Fold { .. }) => self.lost += 1,
            Some(HandResult::Refunded { .. }) | None => self.refunded += 1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        hands: pargs.opt_value_from_str("--hands")?.unwrap_or(100),
        wager: pargs.opt_value_from_str("--wager")?.unwrap_or(20),
        player: pargs.opt_value_from_str("--player")?.unwrap_or(1),
        style: pargs
            .opt_value_from_str("--style")?
            .unwrap_or(Personality::Passive),
        seed: pargs.opt_value_from_str("--seed")?,
    };

    // Finish the current hand on interrupt, then report.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    env_logger::builder().format_target(false).init();

    let mut config = TableConfig::from_env().context("Invalid table configuration")?;
    config.think_time_min_ms = 0;
    config.think_time_max_ms = 0;
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let wallets = Arc::new(WalletManager::new(config.starting_balance));
    let manager = Arc::new(TableManager::new(config, wallets.clone())?);
    let sweeper = manager.spawn_timeout_sweeper();

    let participant = OpponentDecisionMaker::new();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };

    let opening = wallets.get_balance(args.player).await;
    info!(
        "Playing {} hand(s) at wager {} as user {} ({}), balance {opening}",
        args.hands, args.wager, args.player, args.style
    );

    let mut tally = Tally::default();
    for _ in 0..args.hands {
        if !running.load(Ordering::SeqCst) {
            warn!("Interrupted, stopping early");
            break;
        }
        let balance = wallets.get_balance(args.player).await;
        if balance < i64::from(args.wager) {
            warn!("Balance {balance} can't cover wager {}, stopping", args.wager);
            break;
        }

        let mut view = manager.start(args.player, args.wager, None).await?;
        while !view.stage.is_terminal() {
            let Some(seat) = view.turn else {
                bail!("hand stalled at {}", view.stage);
            };
            let ctx = DecisionContext::from_view(&view, seat);
            let action = participant.decide(&ctx, args.style, None, &mut rng);
            view = manager.apply_action(args.player, action).await?;
        }
        debug!("{}", view.status);
        tally.record(&view);
    }
    sweeper.abort();

    let closing = wallets.get_balance(args.player).await;
    info!(
        "Played {}: won {}, lost {}, split {}, refunded {}",
        tally.played, tally.won, tally.lost, tally.split, tally.refunded
    );
    info!("Balance {opening} -> {closing} ({:+})", closing - opening);

    Ok(())
}
