//! ICX 802.1x authentication module
//!
//! Translates a declarative dot1x description into the ICX command lines
//! that realize it. Port-level settings live in the `authentication`
//! sub-mode; RADIUS server settings are global and follow the sub-mode exit.
//!
//! Every setting accepts `state: present | absent`. Absent settings render
//! as the same line behind the `no ` negation token.
//!
//! # Example
//!
//! ```yaml
//! - name: Enable dot1x on a port
//!   icx_flex_dot1x:
//!     enable:
//!       ethernet: 1/1/9
//!     port_control:
//!       auto: yes
//!       ethernet: 1/1/9
//!     radius_server_dead_time:
//!       time: 4
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::common::{block_on, normalize_config_line, ConfigState, NetworkDeviceConnection, NEGATION_TOKEN};
use crate::modules::{
    Diff, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};

/// Command that enters the authentication sub-mode
pub const CONTEXT_ENTER: &str = "authentication";
/// Command that leaves it
pub const CONTEXT_EXIT: &str = "exit";

const MAX_VLAN_ID: u32 = 4095;

/// Setting keys accepted at the top level, besides `check_running_config`
const SETTINGS: [&str; 8] = [
    "enable",
    "port_control",
    "guest_vlan",
    "max_reauth_req",
    "max_req",
    "timeout",
    "radius_server_dead_time",
    "radius_server_test",
];

fn state_of(params: &ModuleParams) -> ModuleResult<ConfigState> {
    match params.get_string("state")? {
        Some(state) => state.parse(),
        None => Ok(ConfigState::default()),
    }
}

fn required_u32(params: &ModuleParams, setting: &str, key: &str) -> ModuleResult<u32> {
    params
        .get_u32(key)?
        .ok_or_else(|| ModuleError::MissingParameter(format!("{}.{}", setting, key)))
}

/// Port scope shared by `enable` and `port_control`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortScope {
    pub all: bool,
    pub ethernet: Vec<String>,
}

impl PortScope {
    fn from_params(params: &ModuleParams, setting: &str) -> ModuleResult<Self> {
        let scope = Self {
            all: params.get_bool("all")?.unwrap_or(false),
            ethernet: params
                .get_vec_string("ethernet")?
                .unwrap_or_default()
                .into_iter()
                .filter(|port| !port.is_empty())
                .collect(),
        };
        if scope.all && !scope.ethernet.is_empty() {
            return Err(ModuleError::InvalidParameter(format!(
                "{}: all and ethernet are mutually exclusive",
                setting
            )));
        }
        Ok(scope)
    }

    fn is_empty(&self) -> bool {
        !self.all && self.ethernet.is_empty()
    }

    fn render(&self) -> String {
        if self.all {
            " all".to_string()
        } else {
            self.ethernet
                .iter()
                .map(|port| format!(" ethernet {}", port))
                .collect()
        }
    }
}

/// `dot1x enable`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnableSpec {
    pub scope: PortScope,
    pub state: ConfigState,
}

impl EnableSpec {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        Ok(Self {
            scope: PortScope::from_params(params, "enable")?,
            state: state_of(params)?,
        })
    }

    pub fn line(&self) -> String {
        format!("dot1x enable{}", self.scope.render())
    }
}

/// Port authorization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortControlMode {
    Auto,
    ForceAuthorized,
    ForceUnauthorized,
}

impl PortControlMode {
    const OPTIONS: [(&'static str, PortControlMode); 3] = [
        ("auto", PortControlMode::Auto),
        ("force_authorized", PortControlMode::ForceAuthorized),
        ("force_unauthorized", PortControlMode::ForceUnauthorized),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PortControlMode::Auto => "auto",
            PortControlMode::ForceAuthorized => "force-authorized",
            PortControlMode::ForceUnauthorized => "force-unauthorized",
        }
    }
}

/// `dot1x port-control`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortControlSpec {
    pub mode: PortControlMode,
    pub scope: PortScope,
    pub state: ConfigState,
}

impl PortControlSpec {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let mut selected = Vec::new();
        for (key, mode) in PortControlMode::OPTIONS {
            if params.get_bool(key)?.unwrap_or(false) {
                selected.push(mode);
            }
        }
        let mode = match selected.as_slice() {
            [mode] => *mode,
            _ => {
                return Err(ModuleError::InvalidParameter(
                    "port_control: exactly one of auto, force_authorized, force_unauthorized must be set"
                        .to_string(),
                ))
            }
        };

        let scope = PortScope::from_params(params, "port_control")?;
        if scope.is_empty() {
            return Err(ModuleError::InvalidParameter(
                "port_control: one of all or ethernet is required".to_string(),
            ));
        }

        Ok(Self {
            mode,
            scope,
            state: state_of(params)?,
        })
    }

    pub fn line(&self) -> String {
        format!("dot1x port-control {}{}", self.mode.as_str(), self.scope.render())
    }
}

/// `dot1x guest-vlan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestVlanSpec {
    pub vlan_id: u16,
    pub state: ConfigState,
}

impl GuestVlanSpec {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let vlan_id = required_u32(params, "guest_vlan", "vlan_id")?;
        if !(1..=MAX_VLAN_ID).contains(&vlan_id) {
            return Err(ModuleError::InvalidParameter(format!(
                "guest_vlan: vlan_id must be between 1 and {}, got {}",
                MAX_VLAN_ID, vlan_id
            )));
        }
        Ok(Self {
            vlan_id: vlan_id as u16,
            state: state_of(params)?,
        })
    }

    pub fn line(&self) -> String {
        format!("dot1x guest-vlan {}", self.vlan_id)
    }
}

/// A counter setting such as `max-req`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSpec {
    pub count: u32,
    pub state: ConfigState,
}

impl CountSpec {
    pub fn from_params(params: &ModuleParams, setting: &str) -> ModuleResult<Self> {
        Ok(Self {
            count: required_u32(params, setting, "count")?,
            state: state_of(params)?,
        })
    }
}

/// `dot1x timeout`, one line per timer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSpec {
    pub quiet_period: Option<u32>,
    pub supplicant: Option<u32>,
    pub tx_period: Option<u32>,
    pub state: ConfigState,
}

impl TimeoutSpec {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let spec = Self {
            quiet_period: params.get_u32("quiet_period")?,
            supplicant: params.get_u32("supplicant")?,
            tx_period: params.get_u32("tx_period")?,
            state: state_of(params)?,
        };
        if spec.timers().is_empty() {
            return Err(ModuleError::InvalidParameter(
                "timeout: one of quiet_period, supplicant, tx_period is required".to_string(),
            ));
        }
        Ok(spec)
    }

    fn timers(&self) -> Vec<(&'static str, u32)> {
        [
            ("quiet-period", self.quiet_period),
            ("supplicant", self.supplicant),
            ("tx-period", self.tx_period),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.timers()
            .into_iter()
            .map(|(name, seconds)| format!("dot1x timeout {} {}", name, seconds))
            .collect()
    }
}

/// `radius-server dead-time`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadTimeSpec {
    pub time: u32,
    pub state: ConfigState,
}

/// `radius-server test`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiusTestSpec {
    pub user_name: String,
    pub state: ConfigState,
}

/// Desired dot1x configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dot1xConfig {
    pub enable: Option<EnableSpec>,
    pub port_control: Option<PortControlSpec>,
    pub guest_vlan: Option<GuestVlanSpec>,
    pub max_reauth_req: Option<CountSpec>,
    pub max_req: Option<CountSpec>,
    pub timeout: Option<TimeoutSpec>,
    pub radius_server_dead_time: Option<DeadTimeSpec>,
    pub radius_server_test: Option<RadiusTestSpec>,
}

impl Dot1xConfig {
    /// Build the typed configuration from module parameters
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        if let Some(key) = params
            .keys()
            .find(|key| !SETTINGS.contains(&key.as_str()) && *key != "check_running_config")
        {
            return Err(ModuleError::InvalidParameter(format!(
                "unsupported parameter '{}'",
                key
            )));
        }

        let nested = |key: &str| params.get_params(key);

        Ok(Self {
            enable: nested("enable")?
                .map(|p| EnableSpec::from_params(&p))
                .transpose()?,
            port_control: nested("port_control")?
                .map(|p| PortControlSpec::from_params(&p))
                .transpose()?,
            guest_vlan: nested("guest_vlan")?
                .map(|p| GuestVlanSpec::from_params(&p))
                .transpose()?,
            max_reauth_req: nested("max_reauth_req")?
                .map(|p| CountSpec::from_params(&p, "max_reauth_req"))
                .transpose()?,
            max_req: nested("max_req")?
                .map(|p| CountSpec::from_params(&p, "max_req"))
                .transpose()?,
            timeout: nested("timeout")?
                .map(|p| TimeoutSpec::from_params(&p))
                .transpose()?,
            radius_server_dead_time: nested("radius_server_dead_time")?
                .map(|p| -> ModuleResult<DeadTimeSpec> {
                    Ok(DeadTimeSpec {
                        time: required_u32(&p, "radius_server_dead_time", "time")?,
                        state: state_of(&p)?,
                    })
                })
                .transpose()?,
            radius_server_test: nested("radius_server_test")?
                .map(|p| -> ModuleResult<RadiusTestSpec> {
                    let user_name = p.get_string("user_name")?.ok_or_else(|| {
                        ModuleError::MissingParameter("radius_server_test.user_name".to_string())
                    })?;
                    if user_name.trim().is_empty() {
                        return Err(ModuleError::InvalidParameter(
                            "radius_server_test.user_name must not be empty".to_string(),
                        ));
                    }
                    Ok(RadiusTestSpec {
                        user_name,
                        state: state_of(&p)?,
                    })
                })
                .transpose()?,
        })
    }
}

// ============================================================================
// Command Plan
// ============================================================================

/// Ordered commands realizing a [`Dot1xConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPlan {
    /// Lines inside the authentication sub-mode
    pub context: Vec<String>,
    /// Top-level lines, sent after leaving the sub-mode
    pub global: Vec<String>,
}

impl CommandPlan {
    /// Synthesize the plan. Fails when `enable` is missing.
    pub fn build(config: &Dot1xConfig) -> ModuleResult<Self> {
        let enable = config
            .enable
            .as_ref()
            .ok_or_else(|| ModuleError::MissingParameter("enable".to_string()))?;

        let mut context = vec![enable.state.render(&enable.line())];

        if let Some(spec) = &config.port_control {
            context.push(spec.state.render(&spec.line()));
        }
        if let Some(spec) = &config.guest_vlan {
            context.push(spec.state.render(&spec.line()));
        }
        if let Some(spec) = &config.max_reauth_req {
            context.push(
                spec.state
                    .render(&format!("dot1x max-reauth-req {}", spec.count)),
            );
        }
        if let Some(spec) = &config.max_req {
            context.push(spec.state.render(&format!("dot1x max-req {}", spec.count)));
        }
        if let Some(spec) = &config.timeout {
            context.extend(spec.lines().iter().map(|line| spec.state.render(line)));
        }

        let mut global = Vec::new();
        if let Some(spec) = &config.radius_server_dead_time {
            global.push(
                spec.state
                    .render(&format!("radius-server dead-time {}", spec.time)),
            );
        }
        if let Some(spec) = &config.radius_server_test {
            global.push(
                spec.state
                    .render(&format!("radius-server test {}", spec.user_name)),
            );
        }

        Ok(Self { context, global })
    }

    /// Drop lines the running configuration already satisfies.
    ///
    /// A present line is satisfied when the running config contains it; an
    /// absent line when the running config does not contain its positive form.
    pub fn prune(&mut self, running_config: &str) {
        let running: HashSet<String> = running_config
            .lines()
            .map(normalize_config_line)
            .filter(|line| !line.is_empty())
            .collect();

        let needed = |line: &String| match line.strip_prefix(NEGATION_TOKEN) {
            Some(positive) => running.contains(&normalize_config_line(positive)),
            None => !running.contains(&normalize_config_line(line)),
        };

        self.context.retain(needed);
        self.global.retain(needed);
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.global.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands().len()
    }

    /// Render the plan as the command list sent to the switch
    pub fn commands(&self) -> Vec<String> {
        let mut commands = Vec::with_capacity(self.context.len() + self.global.len() + 2);
        if !self.context.is_empty() {
            commands.push(CONTEXT_ENTER.to_string());
            commands.extend(self.context.iter().cloned());
            commands.push(CONTEXT_EXIT.to_string());
        }
        commands.extend(self.global.iter().cloned());
        commands
    }
}

// ============================================================================
// Module
// ============================================================================

/// Module that configures dot1x authentication on ICX switches
pub struct IcxFlexDot1xModule;

impl IcxFlexDot1xModule {
    fn device(context: &ModuleContext) -> ModuleResult<NetworkDeviceConnection> {
        context
            .connection
            .as_ref()
            .map(|conn| NetworkDeviceConnection::new(Arc::clone(conn)))
            .ok_or_else(|| {
                ModuleError::ExecutionFailed(
                    "No connection available for icx_flex_dot1x".to_string(),
                )
            })
    }

    fn plan(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<CommandPlan> {
        let config = Dot1xConfig::from_params(params)?;
        let mut plan = CommandPlan::build(&config)?;

        if params.get_bool("check_running_config")?.unwrap_or(false) {
            let device = Self::device(context)?;
            let running = block_on(device.get_running_config())??;
            let before = plan.len();
            plan.prune(&running);
            debug!(
                host = %device.hostname(),
                before,
                after = plan.len(),
                "Pruned commands against running config"
            );
        }

        Ok(plan)
    }
}

impl Module for IcxFlexDot1xModule {
    fn name(&self) -> &'static str {
        "icx_flex_dot1x"
    }

    fn description(&self) -> &'static str {
        "Configure 802.1x authentication on Ruckus ICX switches"
    }

    fn required_params(&self) -> &[&'static str] {
        &["enable"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        CommandPlan::build(&Dot1xConfig::from_params(params)?)?;
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let plan = self.plan(params, context)?;
        let commands = plan.commands();

        if commands.is_empty() {
            return Ok(ModuleOutput::ok("dot1x configuration already up to date")
                .with_data("commands", json!(commands)));
        }

        let diff = Diff::new("", format!("{} dot1x command(s)", commands.len()))
            .with_details(commands.join("\n"));

        if context.check_mode {
            return Ok(ModuleOutput::changed(format!(
                "Would apply {} dot1x command(s)",
                commands.len()
            ))
            .with_diff(diff)
            .with_data("commands", json!(commands)));
        }

        let device = Self::device(context)?;
        block_on(device.load_config(&commands))??;
        info!(host = %device.hostname(), commands = commands.len(), "Applied dot1x configuration");

        Ok(
            ModuleOutput::changed(format!("Applied {} dot1x command(s)", commands.len()))
                .with_diff(diff)
                .with_data("commands", json!(commands)),
        )
    }
}
