//! Events read back from transaction logs.
//!
//! Lives in its own test binary: the log bridge below replaces the
//! process-wide syscall stubs, which must not happen while other tests run.

use base64::{engine::general_purpose::STANDARD, Engine};
use borsh::BorshSerialize;
use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    instruction::Instruction,
    native_token::LAMPORTS_PER_SOL,
    program_stubs::{set_syscall_stubs, SyscallStubs},
    pubkey::Pubkey,
};
use solana_program_test::{processor, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use binary_market_program::{
    events::{MarketEvent, EVENT_TAG},
    instruction::{self, CreateMarketArgs, InitializeRegistryArgs},
    processor::process_instruction,
    state::{find_market_address, Outcome, DEFAULT_FEE_BPS, DEFAULT_MIN_BUY, DEFAULT_SHARE_PRICE, SECONDS_PER_DAY},
};

const DATA_PREFIX: &str = "Program data: ";

/// Wraps the program-test stubs and routes `sol_log_data` into the log
/// collector, which builtin programs otherwise bypass. On chain the runtime
/// writes the same base64 fields after `Program data: `.
struct EventLogBridge {
    inner: Box<dyn SyscallStubs>,
}

impl SyscallStubs for EventLogBridge {
    fn sol_log(&self, message: &str) {
        self.inner.sol_log(message)
    }
    fn sol_log_compute_units(&self) {
        self.inner.sol_log_compute_units()
    }
    fn sol_remaining_compute_units(&self) -> u64 {
        self.inner.sol_remaining_compute_units()
    }
    fn sol_invoke_signed(
        &self,
        instruction: &Instruction,
        account_infos: &[AccountInfo],
        signers_seeds: &[&[&[u8]]],
    ) -> ProgramResult {
        self.inner.sol_invoke_signed(instruction, account_infos, signers_seeds)
    }
    fn sol_get_clock_sysvar(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_clock_sysvar(var_addr)
    }
    fn sol_get_epoch_schedule_sysvar(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_epoch_schedule_sysvar(var_addr)
    }
    fn sol_get_fees_sysvar(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_fees_sysvar(var_addr)
    }
    fn sol_get_rent_sysvar(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_rent_sysvar(var_addr)
    }
    fn sol_get_epoch_rewards_sysvar(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_epoch_rewards_sysvar(var_addr)
    }
    fn sol_get_last_restart_slot(&self, var_addr: *mut u8) -> u64 {
        self.inner.sol_get_last_restart_slot(var_addr)
    }
    fn sol_get_return_data(&self) -> Option<(Pubkey, Vec<u8>)> {
        self.inner.sol_get_return_data()
    }
    fn sol_set_return_data(&self, data: &[u8]) {
        self.inner.sol_set_return_data(data)
    }
    fn sol_log_data(&self, fields: &[&[u8]]) {
        let encoded: Vec<String> = fields.iter().map(|field| STANDARD.encode(field)).collect();
        self.inner.sol_log(&format!("{}{}", DATA_PREFIX, encoded.join(" ")));
    }
    fn sol_get_processed_sibling_instruction(&self, index: usize) -> Option<Instruction> {
        self.inner.sol_get_processed_sibling_instruction(index)
    }
    fn sol_get_stack_height(&self) -> u64 {
        self.inner.sol_get_stack_height()
    }
}

/// Install the bridge on top of the stubs program-test set up on start
fn bridge_event_logs() {
    struct Unset;
    impl SyscallStubs for Unset {}

    let inner = set_syscall_stubs(Box::new(Unset));
    set_syscall_stubs(Box::new(EventLogBridge { inner }));
}

/// Decode every event of ours found in a transaction's log
fn decode_events(log_messages: &[String]) -> Vec<MarketEvent> {
    log_messages
        .iter()
        .filter_map(|line| line.split_once(DATA_PREFIX))
        .filter_map(|(_, encoded)| {
            let fields = encoded
                .split(' ')
                .map(|field| STANDARD.decode(field))
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            let slices: Vec<&[u8]> = fields.iter().map(Vec::as_slice).collect();
            MarketEvent::decode(&slices)
        })
        .collect()
}

async fn send_for_events(
    context: &mut ProgramTestContext,
    ix: Instruction,
    signers: &[&Keypair],
) -> Vec<MarketEvent> {
    let blockhash = context.get_new_latest_blockhash().await.unwrap();
    let mut keys: Vec<&Keypair> = vec![&context.payer];
    keys.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(&[ix], Some(&context.payer.pubkey()), &keys, blockhash);
    let outcome = context.banks_client.process_transaction_with_metadata(tx).await.unwrap();
    outcome.result.unwrap();
    decode_events(&outcome.metadata.unwrap().log_messages)
}

#[test]
fn test_decode_events_skips_foreign_lines() {
    let payload = MarketEvent::CreationFeeUpdated { old_fee: 1, new_fee: 2 };
    let data = payload.try_to_vec().unwrap();
    let ours = format!(
        "Program log: {}{} {}",
        DATA_PREFIX,
        STANDARD.encode(EVENT_TAG),
        STANDARD.encode(data)
    );
    let logs = vec![
        "Program log: Instruction: SetCreationFee".to_string(),
        format!("{}{}", DATA_PREFIX, STANDARD.encode(b"other")),
        format!("{}not-base64!", DATA_PREFIX),
        ours,
    ];
    assert_eq!(decode_events(&logs), vec![payload]);
}

#[tokio::test]
async fn test_buy_and_claim_emit_events() {
    let program_id = binary_market_program::id();
    let mut program_test = ProgramTest::new("binary_market_program", program_id, processor!(process_instruction));
    let owner = Keypair::new();
    let creator = Keypair::new();
    let alice = Keypair::new();
    for keypair in [&owner, &creator, &alice] {
        program_test.add_account(
            keypair.pubkey(),
            Account {
                lamports: 10 * LAMPORTS_PER_SOL,
                ..Account::default()
            },
        );
    }
    let mut context = program_test.start_with_context().await;
    bridge_event_logs();

    let ix = instruction::initialize_registry(
        &program_id,
        &owner.pubkey(),
        InitializeRegistryArgs {
            market_admin: owner.pubkey(),
            creation_fee: 0,
            share_price: DEFAULT_SHARE_PRICE,
            min_buy: DEFAULT_MIN_BUY,
            fee_bps: DEFAULT_FEE_BPS,
        },
    )
    .unwrap();
    let events = send_for_events(&mut context, ix, &[&owner]).await;
    assert!(matches!(events.as_slice(), [MarketEvent::RegistryInitialized { creation_fee: 0, .. }]));

    let ix = instruction::create_market(
        &program_id,
        &creator.pubkey(),
        0,
        CreateMarketArgs {
            question: "Will it rain?".to_string(),
            description: String::new(),
            duration_days: 1,
            payment: 0,
        },
    )
    .unwrap();
    let events = send_for_events(&mut context, ix, &[&creator]).await;
    let (market_address, _) = find_market_address(&program_id, 0);
    match events.as_slice() {
        [MarketEvent::MarketCreated { market_id, market, question, .. }] => {
            assert_eq!(*market_id, 0);
            assert_eq!(*market, market_address);
            assert_eq!(question, "Will it rain?");
        }
        other => panic!("unexpected events: {:?}", other),
    }

    let ix = instruction::buy(&program_id, &alice.pubkey(), 0, Outcome::Yes, LAMPORTS_PER_SOL).unwrap();
    let events = send_for_events(&mut context, ix, &[&alice]).await;
    match events.as_slice() {
        [MarketEvent::TradeRecorded { market_id, participant, outcome, shares, value, .. }] => {
            assert_eq!(*market_id, 0);
            assert_eq!(*participant, alice.pubkey());
            assert_eq!(*outcome, Outcome::Yes);
            assert_eq!(*shares, 100);
            assert_eq!(*value, LAMPORTS_PER_SOL);
        }
        other => panic!("unexpected events: {:?}", other),
    }

    let mut clock: solana_program::sysvar::clock::Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp += 2 * SECONDS_PER_DAY;
    context.set_sysvar(&clock);

    let ix = instruction::resolve(&program_id, &creator.pubkey(), 0, Outcome::Yes).unwrap();
    let events = send_for_events(&mut context, ix, &[&creator]).await;
    assert!(matches!(
        events.as_slice(),
        [MarketEvent::MarketResolved { outcome: Outcome::Yes, emergency: false, .. }]
    ));

    let ix = instruction::claim(&program_id, &alice.pubkey(), 0).unwrap();
    let events = send_for_events(&mut context, ix, &[&alice]).await;
    let fee = LAMPORTS_PER_SOL * u64::from(DEFAULT_FEE_BPS) / 10_000;
    assert_eq!(
        events,
        vec![MarketEvent::WinningsClaimed {
            market_id: 0,
            participant: alice.pubkey(),
            gross: LAMPORTS_PER_SOL,
            fee,
            net: LAMPORTS_PER_SOL - fee,
        }]
    );
}
