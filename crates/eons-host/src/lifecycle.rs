//! Per-object plug-in lifecycle management
//!
//! A [`PluginLifecycle`] owns the instance slot of one installed plug-in.
//! It creates instances through the registry, drives them through
//! `initialize` / `show` / `unload`, and records failures against the
//! owning bundle's catalog uuid.
//!
//! All operations on one lifecycle are serialized by a reentrant lock.
//! Plug-in code runs while the lock is held, so a plug-in that calls back
//! into its own lifecycle (for example by asking its owner for its name
//! while it is starting) does not deadlock; the nested start or stop is
//! refused with [`LifecycleError::Reentrant`] instead.

use crate::panic_guard::catch_panic;
use crate::{LifecycleError, PluginServices};
use eons_bundle::{BundleKind, PluginIdentifier};
use eons_core::{
    ActivationModifiers, Image, InstalledObject, LifecycleState, Plugin, PluginContext,
    PluginType,
};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Metadata read from a plug-in instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub version: f64,
    pub plugin_type: PluginType,
    pub accelerator: Option<String>,
    pub image: Option<Image>,
    /// True when the plug-in could not be started and the other fields
    /// are placeholders.
    pub degraded: bool,
}

impl PluginInfo {
    /// Description shown for plug-ins whose metadata could not be read.
    pub const DEGRADED_DESCRIPTION: &'static str = "This plug-in could not be started";

    /// Placeholder metadata for a plug-in that failed to start.
    pub fn degraded(identifier: &PluginIdentifier) -> Self {
        Self {
            name: identifier.decorated().to_string(),
            description: Self::DEGRADED_DESCRIPTION.to_string(),
            version: 1.0,
            plugin_type: PluginType::Activated,
            accelerator: None,
            image: None,
            degraded: true,
        }
    }

    fn harvest(identifier: &PluginIdentifier, plugin: &dyn Plugin) -> Self {
        let read = || PluginInfo {
            name: plugin.name(),
            description: plugin.description(),
            version: plugin.version(),
            plugin_type: plugin.plugin_type(),
            accelerator: plugin.default_accelerator_key(),
            image: plugin.representative_image(),
            degraded: false,
        };
        catch_panic(identifier.decorated(), AssertUnwindSafe(read))
            .unwrap_or_else(|_| Self::degraded(identifier))
    }
}

#[derive(Default)]
struct Slot {
    state: LifecycleState,
    instance: Option<Arc<dyn Plugin>>,
    plugin_type: Option<PluginType>,
    ever_started: bool,
    info: Option<PluginInfo>,
}

impl Slot {
    fn running(&self) -> Option<&Arc<dyn Plugin>> {
        self.instance.as_ref().filter(|_| self.state.is_running())
    }
}

/// Starts, stops and probes the plug-in of one installed object.
pub struct PluginLifecycle {
    identifier: PluginIdentifier,
    catalog_uuid: Option<Uuid>,
    owner: Weak<dyn InstalledObject>,
    services: Arc<PluginServices>,
    // the RefCell borrow is never held while plug-in code runs
    slot: ReentrantMutex<RefCell<Slot>>,
}

impl PluginLifecycle {
    /// Create the lifecycle for `identifier`.
    ///
    /// Failures are recorded against `catalog_uuid`; `owner` is handed to
    /// the plug-in through its context.
    pub fn new(
        identifier: PluginIdentifier,
        catalog_uuid: Option<Uuid>,
        owner: Weak<dyn InstalledObject>,
        services: Arc<PluginServices>,
    ) -> Self {
        Self {
            identifier,
            catalog_uuid,
            owner,
            services,
            slot: ReentrantMutex::new(RefCell::new(Slot::default())),
        }
    }

    pub fn identifier(&self) -> &PluginIdentifier {
        &self.identifier
    }

    pub fn catalog_uuid(&self) -> Option<Uuid> {
        self.catalog_uuid
    }

    pub fn state(&self) -> LifecycleState {
        self.with_slot(|slot| slot.state)
    }

    /// Check if an instance is running.
    pub fn is_started(&self) -> bool {
        self.with_slot(|slot| slot.running().is_some())
    }

    /// The running instance, if any.
    pub fn plugin(&self) -> Option<Arc<dyn Plugin>> {
        self.with_slot(|slot| slot.running().cloned())
    }

    /// Type reported by the last instance that initialized.
    pub fn plugin_type(&self) -> Option<PluginType> {
        self.with_slot(|slot| slot.plugin_type)
    }

    pub fn has_ever_started(&self) -> bool {
        self.with_slot(|slot| slot.ever_started)
    }

    /// Metadata, if a probe or a start has already collected it.
    pub fn info(&self) -> Option<PluginInfo> {
        self.with_slot(|slot| slot.info.clone())
    }

    /// Start the plug-in, or return the instance that is already running.
    ///
    /// An extension starts at most once: after its instance has stopped,
    /// starting it again is an [`LifecycleError::ExtensionRestart`].
    pub fn start(&self, modifiers: ActivationModifiers) -> Result<Arc<dyn Plugin>, LifecycleError> {
        let _guard = self.slot.lock();
        self.with_slot(|slot| {
            if slot.state.is_transitioning() {
                return Err(self.reentrant(slot.state));
            }
            if let Some(instance) = slot.running() {
                return Ok(Some(Arc::clone(instance)));
            }
            if slot.ever_started && slot.plugin_type == Some(PluginType::Extension) {
                return Err(LifecycleError::ExtensionRestart(self.decorated()));
            }
            Ok(None)
        })?
        .map_or_else(|| self.start_instance(modifiers, false), Ok)
    }

    /// Hide and unload the running instance.
    ///
    /// Stopping a plug-in that is not running does nothing. The instance is
    /// discarded even when hiding or unloading fails.
    pub fn stop(&self) -> Result<(), LifecycleError> {
        let _guard = self.slot.lock();
        let running = self.with_slot(|slot| {
            if slot.state.is_transitioning() {
                return Err(self.reentrant(slot.state));
            }
            let Some(instance) = slot.running().cloned() else {
                return Ok(None);
            };
            slot.state = LifecycleState::Stopping;
            Ok(Some((instance, slot.plugin_type.unwrap_or_default())))
        })?;
        let Some((instance, plugin_type)) = running else {
            return Ok(());
        };

        let identifier = self.decorated();
        let mut failure = None;

        if plugin_type == PluginType::Activated {
            let showing = catch_panic(&identifier, AssertUnwindSafe(|| instance.is_showing()))
                .unwrap_or(false);
            if showing {
                let ctx = self.context(&instance, ActivationModifiers::NONE, false);
                let hidden =
                    catch_panic(&identifier, AssertUnwindSafe(|| instance.show(&ctx, false)));
                failure = match hidden {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(format!("hide failed: {e}")),
                    Err(panic) => Some(panic),
                };
            }
        }

        let unloaded = match catch_panic(&identifier, AssertUnwindSafe(|| instance.unload())) {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic),
        };
        let failure = failure.or(unloaded);

        self.with_slot(|slot| {
            slot.instance = None;
            slot.state = if failure.is_some() {
                LifecycleState::Failed
            } else {
                LifecycleState::Stopped
            };
        });

        match failure {
            None => {
                info!(identifier = %identifier, "Plug-in stopped");
                Ok(())
            }
            Some(reason) => {
                self.mark_failed();
                error!(identifier = %identifier, reason = %reason, "Plug-in failed to stop");
                Err(LifecycleError::StopFailed { identifier, reason })
            }
        }
    }

    /// Show or hide the running instance.
    pub fn show(&self, modifiers: ActivationModifiers, show: bool) -> Result<(), LifecycleError> {
        let _guard = self.slot.lock();
        let identifier = self.decorated();
        let instance = self.plugin().ok_or_else(|| LifecycleError::ShowFailed {
            identifier: identifier.clone(),
            reason: "plug-in is not running".to_string(),
        })?;

        let ctx = self.context(&instance, modifiers, false);
        let shown = catch_panic(&identifier, AssertUnwindSafe(|| instance.show(&ctx, show)));
        let reason = match shown {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic,
        };
        warn!(identifier = %identifier, show, reason = %reason, "Plug-in show failed");
        Err(LifecycleError::ShowFailed { identifier, reason })
    }

    /// Menu activation: start the plug-in if needed, then toggle it.
    ///
    /// Only activated plug-ins toggle; other types are just started.
    /// Returns whether the plug-in is showing afterwards.
    pub fn activate(&self, modifiers: ActivationModifiers) -> Result<bool, LifecycleError> {
        let _guard = self.slot.lock();
        let instance = self.start(modifiers)?;
        if self.plugin_type() != Some(PluginType::Activated) {
            return Ok(false);
        }
        let identifier = self.decorated();
        let showing = catch_panic(&identifier, AssertUnwindSafe(|| instance.is_showing()))
            .map_err(|reason| LifecycleError::ShowFailed { identifier, reason })?;
        let showing = !showing;
        self.show(modifiers, showing)?;
        Ok(showing)
    }

    /// Read the plug-in's metadata, starting it once if needed.
    ///
    /// Runs at most once. A reloadable plug-in is stopped again after the
    /// probe. An extension bundle is started for real instead of probed and
    /// keeps running, since that is its one start.
    /// If the probe fails the result is degraded placeholder metadata, which
    /// is kept like any other.
    pub fn collect_plugin_info(&self) -> PluginInfo {
        let _guard = self.slot.lock();
        let (cached, state) = self.with_slot(|slot| (slot.info.clone(), slot.state));
        if let Some(info) = cached {
            return info;
        }
        if state.is_transitioning() {
            debug!(
                identifier = %self.identifier,
                "Metadata requested while starting; using placeholders"
            );
            return PluginInfo::degraded(&self.identifier);
        }

        let information_probe = !self.is_extension_bundle();
        match self.start_instance(ActivationModifiers::NONE, information_probe) {
            Ok(_) => {
                let reloadable = self.with_slot(|slot| {
                    slot.plugin_type.is_none_or(|plugin_type| plugin_type.is_reloadable())
                });
                if reloadable {
                    if let Err(e) = self.stop() {
                        warn!(
                            identifier = %self.identifier,
                            error = %e,
                            "Could not stop probed plug-in"
                        );
                    }
                }
            }
            Err(e) => {
                warn!(
                    identifier = %self.identifier,
                    error = %e,
                    "Could not collect plug-in information"
                );
                let degraded = PluginInfo::degraded(&self.identifier);
                self.with_slot(|slot| slot.info = Some(degraded));
            }
        }

        self.info()
            .unwrap_or_else(|| PluginInfo::degraded(&self.identifier))
    }

    fn start_instance(
        &self,
        modifiers: ActivationModifiers,
        information_probe: bool,
    ) -> Result<Arc<dyn Plugin>, LifecycleError> {
        self.transition(LifecycleState::Starting)?;
        let identifier = self.decorated();

        let instance = match self.services.registry().instantiate(&self.identifier) {
            Ok(instance) => instance,
            Err(e) => return Err(self.fail_start(e)),
        };

        let ctx = self.context(&instance, modifiers, information_probe);
        let initialized =
            catch_panic(&identifier, AssertUnwindSafe(|| instance.initialize(&ctx)));
        let reason = match initialized {
            Ok(Ok(true)) => None,
            Ok(Ok(false)) => Some("initialize returned false".to_string()),
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic),
        };
        if let Some(reason) = reason {
            let err = LifecycleError::InitializationFailed { identifier, reason };
            return Err(self.fail_start(err));
        }

        let info = PluginInfo::harvest(&self.identifier, instance.as_ref());
        let plugin_type = info.plugin_type;
        self.with_slot(|slot| {
            slot.state = LifecycleState::Active;
            slot.instance = Some(Arc::clone(&instance));
            slot.plugin_type = Some(plugin_type);
            if !information_probe || !plugin_type.is_reloadable() {
                slot.ever_started = true;
            }
            slot.info.get_or_insert(info);
        });

        info!(
            identifier = %identifier,
            plugin_type = %plugin_type,
            information_probe,
            "Plug-in started"
        );
        Ok(instance)
    }

    fn is_extension_bundle(&self) -> bool {
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.kind() == BundleKind::Extension)
    }

    fn fail_start(&self, err: LifecycleError) -> LifecycleError {
        self.with_slot(|slot| {
            slot.instance = None;
            slot.state = LifecycleState::Failed;
        });
        self.mark_failed();
        error!(identifier = %self.identifier, error = %err, "Plug-in failed to start");
        err
    }

    fn mark_failed(&self) {
        if let Some(uuid) = self.catalog_uuid {
            self.services.failures().mark_failed(uuid);
        }
    }

    fn transition(&self, target: LifecycleState) -> Result<(), LifecycleError> {
        self.with_slot(|slot| {
            if !slot.state.can_transition_to(target) {
                return Err(LifecycleError::InvalidState {
                    identifier: self.decorated(),
                    from: slot.state,
                    to: target,
                });
            }
            slot.state = target;
            Ok(())
        })
    }

    fn context(
        &self,
        instance: &Arc<dyn Plugin>,
        modifiers: ActivationModifiers,
        information_probe: bool,
    ) -> PluginContext {
        self.services.contexts().create(
            Some(self.owner.clone()),
            Some(instance),
            modifiers,
            information_probe,
        )
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> R {
        let guard = self.slot.lock();
        let mut slot = guard.borrow_mut();
        f(&mut slot)
    }

    fn reentrant(&self, state: LifecycleState) -> LifecycleError {
        LifecycleError::Reentrant {
            identifier: self.decorated(),
            state,
        }
    }

    fn decorated(&self) -> String {
        self.identifier.decorated().to_string()
    }
}

impl fmt::Debug for PluginLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLifecycle")
            .field("identifier", &self.identifier.to_string())
            .field("catalog_uuid", &self.catalog_uuid)
            .field("state", &self.state())
            .finish()
    }
}
