use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use linkcast_types::ModuleOutput;

use super::context::{HandlerContext, RunContext};
use crate::combat_log::{CombatEvent, FightWindow};
use crate::combatant::Combatant;
use crate::error::AnalyzerError;
use crate::filter::{Actors, EventFilter};

/// Event handler bound to a module type
pub type Handler<M> = fn(&mut M, &CombatEvent, &HandlerContext<'_>) -> Result<(), AnalyzerError>;

/// A unit of analysis driven by the harness.
///
/// `create` runs once per run, after every module named in `DEPENDENCIES`
/// has been built. It decides activation and registers subscriptions through
/// [`Setup`]; nothing can subscribe after it returns.
pub trait Analyzer: Sized + 'static {
    const NAME: &'static str;
    const DEPENDENCIES: &'static [&'static str] = &[];

    fn create(setup: &mut Setup<'_, Self>) -> Result<Self, AnalyzerError>;

    /// Pure read of accumulated state once the stream is exhausted
    fn finalize(&self, run: &RunContext<'_>) -> ModuleOutput;
}

/// Construction-time handle passed to [`Analyzer::create`]
pub struct Setup<'a, M> {
    run: &'a RunContext<'a>,
    built: &'a HashMap<&'static str, Rc<dyn Any>>,
    active: bool,
    listeners: Vec<(EventFilter, Handler<M>)>,
}

impl<'a, M: Analyzer> Setup<'a, M> {
    pub(crate) fn new(
        run: &'a RunContext<'a>,
        built: &'a HashMap<&'static str, Rc<dyn Any>>,
    ) -> Self {
        Self {
            run,
            built,
            active: true,
            listeners: Vec::new(),
        }
    }

    pub fn combatant(&self) -> &'a Combatant {
        self.run.combatant
    }

    pub fn actors(&self) -> &'a Actors {
        self.run.actors
    }

    pub fn fight(&self) -> FightWindow {
        self.run.fight
    }

    /// Dormant modules never receive events and contribute no output.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handlers for one event run in registration order.
    pub fn listen(&mut self, filter: EventFilter, handler: Handler<M>) {
        self.listeners.push((filter, handler));
    }

    /// Read handle to an already-built module named in `M::DEPENDENCIES`.
    pub fn dependency<T: Analyzer>(&self) -> Result<ModuleRef<T>, AnalyzerError> {
        if !M::DEPENDENCIES.contains(&T::NAME) {
            return Err(AnalyzerError::UndeclaredDependency(T::NAME));
        }
        let erased = self
            .built
            .get(T::NAME)
            .cloned()
            .ok_or(AnalyzerError::MissingDependency(T::NAME))?;
        let module = erased
            .downcast::<RefCell<T>>()
            .map_err(|_| AnalyzerError::MissingDependency(T::NAME))?;
        Ok(ModuleRef {
            inner: Rc::downgrade(&module),
        })
    }

    pub(crate) fn into_parts(self) -> (bool, Vec<(EventFilter, Handler<M>)>) {
        (self.active, self.listeners)
    }
}

/// Non-owning read reference to a sibling module. The harness owns it.
pub struct ModuleRef<T> {
    inner: Weak<RefCell<T>>,
}

impl<T: Analyzer> ModuleRef<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AnalyzerError> {
        let module = self.inner.upgrade().ok_or(AnalyzerError::MissingDependency(T::NAME))?;
        let state = module.try_borrow().map_err(|_| AnalyzerError::Reentrant)?;
        Ok(f(&*state))
    }
}

impl<T> Clone for ModuleRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ModuleRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRef")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// ─── Type erasure ───────────────────────────────────────────────────────────

/// Object-safe view of a built module and its subscriptions
pub(crate) trait ModuleSlot {
    fn dispatch(&self, event: &CombatEvent, ctx: &HandlerContext<'_>) -> Result<(), AnalyzerError>;
    fn finalize(&self, run: &RunContext<'_>) -> Result<ModuleOutput, AnalyzerError>;
}

struct Slot<M> {
    module: Rc<RefCell<M>>,
    listeners: Vec<(EventFilter, Handler<M>)>,
}

impl<M: Analyzer> ModuleSlot for Slot<M> {
    fn dispatch(&self, event: &CombatEvent, ctx: &HandlerContext<'_>) -> Result<(), AnalyzerError> {
        for (filter, handler) in &self.listeners {
            if !filter.matches(event, ctx.actors) {
                continue;
            }
            let mut state = self.module.try_borrow_mut().map_err(|_| AnalyzerError::Reentrant)?;
            handler(&mut *state, event, ctx)?;
        }
        Ok(())
    }

    fn finalize(&self, run: &RunContext<'_>) -> Result<ModuleOutput, AnalyzerError> {
        let state = self.module.try_borrow().map_err(|_| AnalyzerError::Reentrant)?;
        Ok(state.finalize(run))
    }
}

pub(crate) struct Built {
    pub slot: Box<dyn ModuleSlot>,
    pub erased: Rc<dyn Any>,
    pub active: bool,
}

pub(crate) type BuildFn =
    fn(&RunContext<'_>, &HashMap<&'static str, Rc<dyn Any>>) -> Result<Built, AnalyzerError>;

pub(crate) fn build_module<M: Analyzer>(
    run: &RunContext<'_>,
    built: &HashMap<&'static str, Rc<dyn Any>>,
) -> Result<Built, AnalyzerError> {
    let mut setup = Setup::<M>::new(run, built);
    let module = M::create(&mut setup)?;
    let (active, listeners) = setup.into_parts();
    let module = Rc::new(RefCell::new(module));
    Ok(Built {
        erased: module.clone(),
        slot: Box::new(Slot { module, listeners }),
        active,
    })
}
