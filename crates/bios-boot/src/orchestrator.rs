use bios_chain::ChainClient;
use bios_core::constants::SYSTEM_ACCOUNT;
use bios_core::{Action, BiosError};
use bios_genesis::KickstartPayload;
use bios_hooks::{HookDispatcher, HookEvent};
use bios_schedule::Role;
use serde_json::json;
use tracing::info;

use crate::boot::run_boot_node;
use crate::context::LaunchContext;
use crate::input::KickstartSource;
use crate::ops::OpRegistry;
use crate::verify::{run_appointed_producer, run_participant};

/// How a completed run went.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub role: Role,
    /// Produced (boot node) or received (everybody else).
    pub kickstart: KickstartPayload,
    /// Encoded kickstart text; only the boot node has it.
    pub kickstart_text: Option<String>,
    pub regproducer_tx: String,
}

/// Drives one operator through the launch, start to finish.
pub struct Orchestrator<C, H, I> {
    ctx: LaunchContext,
    chain: C,
    hooks: H,
    input: I,
    ops: OpRegistry,
}

impl<C, H, I> Orchestrator<C, H, I>
where
    C: ChainClient,
    H: HookDispatcher,
    I: KickstartSource,
{
    pub fn new(ctx: LaunchContext, chain: C, hooks: H, input: I) -> Self {
        Self {
            ctx,
            chain,
            hooks,
            input,
            ops: OpRegistry::builtin(),
        }
    }

    /// Replace the boot-sequence op registry.
    pub fn with_ops(mut self, ops: OpRegistry) -> Self {
        self.ops = ops;
        self
    }

    pub fn context(&self) -> &LaunchContext {
        &self.ctx
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Run every stage in order. The first failure aborts the run, wrapped
    /// with the name of the stage it happened in; the `done` hook only fires
    /// after a fully successful run.
    pub async fn run(&mut self) -> Result<RunReport, BiosError> {
        let role = self.ctx.role();
        let me = self.ctx.local_account().clone();
        info!(account = %me, role = %role, "starting launch");

        if let Some(key) = self.ctx.config.producer.block_signing_key.clone() {
            self.chain
                .import_key(key)
                .await
                .map_err(|e| e.in_stage("setup"))?;
        }

        self.hooks
            .dispatch(&HookEvent::Init {
                my_account: me.clone(),
                role: role.to_string(),
            })
            .await
            .map_err(|e| e.in_stage("init hook"))?;

        print_role_summary(&self.ctx, role);

        let (kickstart, kickstart_text) = match role {
            Role::BootNode => {
                let outcome = run_boot_node(&self.ctx, &mut self.chain, &self.hooks, &self.ops)
                    .await
                    .map_err(|e| e.in_stage("boot node stage"))?;
                (outcome.kickstart, Some(outcome.kickstart_text))
            }
            Role::AppointedProducer => {
                let kickstart =
                    run_appointed_producer(&self.ctx, &self.chain, &self.hooks, &mut self.input)
                        .await
                        .map_err(|e| e.in_stage("abp stage"))?;
                (kickstart, None)
            }
            Role::Participant => {
                let kickstart = run_participant(&self.ctx, &self.hooks, &mut self.input)
                    .await
                    .map_err(|e| e.in_stage("participant stage"))?;
                (kickstart, None)
            }
        };

        let regproducer_tx = self
            .chain
            .push_actions(&[regproducer_action(&self.ctx)?])
            .await
            .map_err(|e| e.in_stage("regproducer"))?;
        info!(tx_id = %regproducer_tx, "producer registered");

        println!("BIOS Sequence Terminated");

        self.hooks
            .dispatch(&HookEvent::Done { my_account: me })
            .await
            .map_err(|e| e.in_stage("done hook"))?;

        Ok(RunReport {
            role,
            kickstart,
            kickstart_text,
            regproducer_tx,
        })
    }
}

/// `regproducer` for the local account, with its block-signing key and the
/// chain parameters it proposes.
pub fn regproducer_action(ctx: &LaunchContext) -> Result<Action, BiosError> {
    let me = ctx.local_account();
    let url = ctx
        .my_producer_defs()?
        .first()
        .and_then(|p| p.urls.first().cloned())
        .unwrap_or_default();
    Ok(Action::new(
        SYSTEM_ACCOUNT,
        "regproducer",
        me,
        json!({
            "producer": me,
            "producer_key": ctx.config.producer.block_signing_public_key,
            "url": url,
            "location": 0,
            "prefs": ctx.config.my_parameters,
        }),
    ))
}

/// Print the schedule and what the local operator does next.
pub fn print_role_summary(ctx: &LaunchContext, role: Role) {
    let seed = ctx.schedule.seed();
    println!();
    println!("###################################  SHUFFLING RESULTS  ####################################");
    println!();
    println!(
        "Seed time {}, root {}",
        seed.time.to_rfc3339(),
        hex::encode(&seed.root)
    );
    println!();
    if let Some(boot) = ctx.schedule.boot_node() {
        println!("BIOS NODE: {boot}");
    }
    for (i, p) in ctx.schedule.appointed().iter().enumerate() {
        println!("ABP {:02}:    {p}", i + 1);
    }
    println!();

    match role {
        Role::BootNode => {
            println!("We are the BOOT NODE. Preparing genesis and running the boot sequence.");
        }
        Role::AppointedProducer => {
            println!("We are an APPOINTED BLOCK PRODUCER. We will wait for the kickstart data");
            println!("and verify the boot node's work.");
        }
        Role::Participant => {
            println!("We are a PARTICIPANT. We will wait for the kickstart data and join the network.");
        }
    }
    println!();
}
