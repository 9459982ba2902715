use confidential_treasury::{
    PrincipalId, SimulatedCiphertextEngine, TreasuryConfig, TreasuryEngine,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Confidential Treasury - Proposal Flow ===\n");

    let fhe = Arc::new(SimulatedCiphertextEngine::new());

    let owner = PrincipalId::new("owner");
    let alice = PrincipalId::new("alice");
    let bob = PrincipalId::new("bob");
    let carol = PrincipalId::new("carol");

    let config = TreasuryConfig::new(
        owner.clone(),
        [owner.clone(), alice.clone(), bob.clone()],
        2, // quorum
    );
    let treasury = TreasuryEngine::new(fhe.clone(), config)?;
    println!(
        "Treasury created with {} members, quorum {}",
        treasury.membership().len(),
        treasury.membership().quorum()
    );

    // Owner deposits 1000, encrypted client-side
    let deposit = fhe.encrypt_u64(1000, &owner);
    let balance = treasury.deposit(&owner, &deposit)?;
    println!("Owner deposited; balance handle is {}", balance);

    // Alice proposes disbursing 600 to Carol
    let request = fhe.encrypt_u64(600, &alice);
    let id = treasury.create_proposal(&alice, &carol, &request, Some(3600))?;
    println!("Alice proposed 600 (encrypted) to Carol as proposal {}", id);

    // Alice and Bob vote yes; quorum is met
    treasury.vote_yes(id, &alice)?;
    treasury.vote_yes(id, &bob)?;
    let snapshot = treasury.proposal(id)?;
    println!(
        "Public proposal metadata: {}",
        serde_json::to_string_pretty(&snapshot)?
    );

    // Execution is branchless on everything confidential
    let status = treasury.execute(id)?;
    println!("Executed proposal {}: status {:?}", id, status);

    // Only granted principals can decrypt
    let access = treasury.access_log()?;
    let executed = treasury.executed_amount_handle(id)?;
    let new_balance = treasury
        .current_balance()?
        .expect("balance initialized by deposit");

    println!(
        "Carol decrypts executed amount: {}",
        fhe.user_decrypt(executed, &carol, &access)?
    );
    println!(
        "Owner decrypts remaining balance: {}",
        fhe.user_decrypt(new_balance, &owner, &access)?
    );
    match fhe.user_decrypt(new_balance, &carol, &access) {
        Err(e) => println!("Carol decrypting the balance fails: {}", e),
        Ok(v) => unreachable!("carol must not read the balance, got {}", v),
    }

    Ok(())
}
