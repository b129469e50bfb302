use bios_chain::ChainClient;
use bios_core::constants::ACTIONS_PER_BATCH;
use bios_core::BiosError;
use bios_crypto::KeyPair;
use bios_genesis::{encode_kickstart, GenesisDescriptor, KickstartPayload};
use bios_hooks::{HookDispatcher, HookEvent};
use tracing::{debug, info};

use crate::batch::chunk_actions;
use crate::context::LaunchContext;
use crate::ops::OpRegistry;

/// What the boot node hands to everybody else.
#[derive(Debug, Clone)]
pub struct BootOutcome {
    pub genesis: GenesisDescriptor,
    pub kickstart: KickstartPayload,
    /// `kickstart`, encoded for pasting.
    pub kickstart_text: String,
}

/// Boot-node stage: create genesis with an ephemeral key, run the whole
/// boot sequence against the local node and publish the kickstart data.
///
/// Any rejected batch aborts the stage; later batches and steps are never
/// submitted.
pub async fn run_boot_node(
    ctx: &LaunchContext,
    chain: &mut dyn ChainClient,
    hooks: &dyn HookDispatcher,
    ops: &OpRegistry,
) -> Result<BootOutcome, BiosError> {
    let ephemeral = KeyPair::generate();
    info!(public_key = %ephemeral.public_key, "generated ephemeral boot key");
    chain.import_key(ephemeral.clone()).await?;

    let chain_id = chain.chain_id().await?;
    let genesis = GenesisDescriptor::new(ctx.schedule.seed().time, &ephemeral.public_key, &chain_id);
    let genesis_json = genesis.to_json();
    info!(
        initial_timestamp = %genesis.initial_timestamp,
        initial_chain_id = %genesis.initial_chain_id,
        "genesis prepared"
    );

    hooks
        .dispatch(&HookEvent::StartBiosBoot {
            genesis_json,
            public_key: ephemeral.public_key.to_string(),
            private_key: ephemeral.private_key.to_text(),
        })
        .await?;

    submit_boot_sequence(ctx, &*chain, ops).await?;

    let kickstart = KickstartPayload::new(
        &ctx.config.producer.secret_p2p_address,
        &ephemeral.public_key,
        &ephemeral.private_key,
        &genesis,
    );
    let kickstart_text = encode_kickstart(&kickstart);

    println!();
    println!("PUBLISH THIS KICKSTART DATA TO THE OTHER BLOCK PRODUCERS:");
    println!();
    println!("{kickstart_text}");
    println!();

    hooks
        .dispatch(&HookEvent::PublishKickstartData {
            kickstart_data: kickstart_text.clone(),
        })
        .await?;

    Ok(BootOutcome {
        genesis,
        kickstart,
        kickstart_text,
    })
}

/// Execute every boot step in order, pushing each step's actions in
/// sequential batches.
pub async fn submit_boot_sequence(
    ctx: &LaunchContext,
    chain: &dyn ChainClient,
    ops: &OpRegistry,
) -> Result<(), BiosError> {
    let steps = &ctx.launch.boot_sequence;
    info!(steps = steps.len(), "running boot sequence");

    for (n, step) in steps.iter().enumerate() {
        let actions = ops.actions_for(step, ctx)?;
        println!("BIOS step {}/{}: {}", n + 1, steps.len(), step.label);
        if actions.is_empty() {
            debug!(step = %step.label, "step produced no actions");
            continue;
        }

        let total = actions.len();
        let batches = chunk_actions(actions, ACTIONS_PER_BATCH);
        let batch_count = batches.len();
        for (batch, chunk) in batches.into_iter().enumerate() {
            let tx_id = chain
                .push_actions(&chunk)
                .await
                .map_err(|e| BiosError::ChainSubmission {
                    step: step.label.clone(),
                    batch,
                    reason: e.to_string(),
                })?;
            debug!(
                step = %step.label,
                batch,
                actions = chunk.len(),
                tx_id = %tx_id,
                "batch accepted"
            );
        }
        info!(step = %step.label, op = %step.op, actions = total, batches = batch_count, "step done");
    }
    Ok(())
}
