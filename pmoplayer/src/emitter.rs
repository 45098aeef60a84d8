//! Système d'abonnement par nom de hook
//!
//! L'[`Emitter`] associe à chaque nom de hook une liste ordonnée de callbacks
//! asynchrones. Une émission appelle d'abord les abonnés du hook joker
//! ([`WILDCARD_HOOK`]) avec le nom du hook en premier argument, puis les
//! abonnés du hook lui-même, un par un et dans l'ordre d'inscription.
//!
//! Un callback qui échoue (erreur retournée ou panique) est journalisé et
//! n'interrompt pas l'émission vers les callbacks suivants.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{error, trace};

pub use crate::hooks::WILDCARD_HOOK;

/// Arguments transmis aux callbacks d'un hook.
pub type HookArgs = Vec<serde_json::Value>;

type HookFuture = BoxFuture<'static, anyhow::Result<()>>;
type HookFn = Arc<dyn Fn(HookArgs) -> HookFuture + Send + Sync>;

struct Callback {
    id: u64,
    hook: HookFn,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    hooks: HashMap<String, Vec<Callback>>,
}

impl Registry {
    fn next_hook_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove(&mut self, hook_name: &str, id: u64) {
        let Some(callbacks) = self.hooks.get_mut(hook_name) else {
            return;
        };

        // L'id peut avoir disparu après un unsubscribe_all
        let Some(index) = callbacks.iter().position(|cb| cb.id == id) else {
            return;
        };

        callbacks.remove(index);
        if callbacks.is_empty() {
            self.hooks.remove(hook_name);
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hub publish/subscribe partagé entre le player et ses collaborateurs.
///
/// Les clones partagent la même table d'abonnements.
///
/// ```
/// use pmoplayer::{Emitter, MediaHook};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let emitter = Emitter::new();
/// let plays = Arc::new(AtomicUsize::new(0));
///
/// let seen = plays.clone();
/// let subscription = emitter.subscribe_sync(MediaHook::AfterPlay, move |_| {
///     seen.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
///
/// emitter.emit(MediaHook::AfterPlay, vec![]).await;
/// subscription.unsubscribe();
/// emitter.emit(MediaHook::AfterPlay, vec![]).await;
///
/// assert_eq!(plays.load(Ordering::SeqCst), 1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Emitter {
    registry: Arc<Mutex<Registry>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inscrit `callback` sous `hook_name`.
    ///
    /// Le [`Subscription`] retourné permet de retirer exactement cette
    /// inscription.
    pub fn subscribe<F, Fut>(&self, hook_name: impl AsRef<str>, callback: F) -> Subscription
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let hook_name = hook_name.as_ref().to_string();
        let hook: HookFn = Arc::new(move |args: HookArgs| callback(args).boxed());

        let mut registry = lock(&self.registry);
        let id = registry.next_hook_id();
        registry
            .hooks
            .entry(hook_name.clone())
            .or_default()
            .push(Callback { id, hook });

        trace!(hook = %hook_name, id, "Hook subscribed");

        Subscription {
            hook_name,
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Variante de [`subscribe`](Self::subscribe) pour un callback synchrone.
    pub fn subscribe_sync<F>(&self, hook_name: impl AsRef<str>, callback: F) -> Subscription
    where
        F: Fn(HookArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(hook_name, move |args| std::future::ready(callback(args)))
    }

    /// Retire tous les callbacks inscrits sous `hook_name`.
    pub fn unsubscribe_all(&self, hook_name: impl AsRef<str>) {
        lock(&self.registry).hooks.remove(hook_name.as_ref());
    }

    /// Nombre de callbacks inscrits sous `hook_name`.
    pub fn subscriber_count(&self, hook_name: impl AsRef<str>) -> usize {
        lock(&self.registry)
            .hooks
            .get(hook_name.as_ref())
            .map_or(0, Vec::len)
    }

    /// Émet `hook_name` vers le joker puis vers ses propres abonnés.
    ///
    /// Ne retourne jamais d'erreur : les échecs des callbacks sont journalisés.
    pub async fn emit(&self, hook_name: impl AsRef<str>, args: HookArgs) {
        let hook_name = hook_name.as_ref();

        // Pas de récursion sur le joker lui-même
        if hook_name != WILDCARD_HOOK {
            let mut wildcard_args = Vec::with_capacity(args.len() + 1);
            wildcard_args.push(serde_json::Value::String(hook_name.to_string()));
            wildcard_args.extend(args.iter().cloned());
            self.dispatch(WILDCARD_HOOK, wildcard_args).await;
        }

        self.dispatch(hook_name, args).await;
    }

    async fn dispatch(&self, hook_name: &str, args: HookArgs) {
        // Copie des callbacks : le verrou ne doit pas traverser un await
        let callbacks: Vec<(u64, HookFn)> = {
            let registry = lock(&self.registry);
            match registry.hooks.get(hook_name) {
                Some(callbacks) => callbacks
                    .iter()
                    .map(|cb| (cb.id, cb.hook.clone()))
                    .collect(),
                None => return,
            }
        };

        trace!(hook = %hook_name, count = callbacks.len(), "Emitting hook");

        for (id, hook) in callbacks {
            let future = match std::panic::catch_unwind(AssertUnwindSafe(|| hook(args.clone()))) {
                Ok(future) => future,
                Err(_) => {
                    error!(hook = %hook_name, id, "Hook callback panicked");
                    continue;
                }
            };

            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(hook = %hook_name, id, error = %err, "Hook callback failed");
                }
                Err(_) => {
                    error!(hook = %hook_name, id, "Hook callback panicked");
                }
            }
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        let mut hooks: Vec<_> = registry
            .hooks
            .iter()
            .map(|(name, cbs)| (name.clone(), cbs.len()))
            .collect();
        hooks.sort();
        f.debug_struct("Emitter").field("hooks", &hooks).finish()
    }
}

/// Jeton de révocation d'une inscription.
///
/// [`unsubscribe`](Self::unsubscribe) est idempotent, y compris après un
/// [`Emitter::unsubscribe_all`]. Abandonner le jeton ne retire pas
/// l'inscription.
#[derive(Clone)]
pub struct Subscription {
    hook_name: String,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn hook_name(&self) -> &str {
        &self.hook_name
    }

    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.hook_name, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("hook_name", &self.hook_name)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(emitter: &Emitter, hook: &str, log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Subscription {
        let log = log.clone();
        let tag = tag.to_string();
        emitter.subscribe_sync(hook, move |args| {
            log.lock()
                .unwrap()
                .push(format!("{tag}:{}", serde_json::Value::Array(args)));
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_emit_and_hook() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&emitter, "test", &log, "a");

        emitter.emit("test", vec![json!(1), json!(2), json!(3)]).await;

        assert_eq!(*log.lock().unwrap(), vec!["a:[1,2,3]"]);
    }

    #[tokio::test]
    async fn test_emit_unknown_hook_is_noop() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&emitter, "test", &log, "a");

        emitter.emit("somethingElse", vec![]).await;

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wildcard_receives_hook_name_first() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&emitter, "test", &log, "hook");
        recorder(&emitter, WILDCARD_HOOK, &log, "wild");

        emitter.emit("test", vec![json!("x")]).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                r#"wild:["test","x"]"#.to_string(),
                r#"hook:["x"]"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_emitting_wildcard_does_not_recurse() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&emitter, WILDCARD_HOOK, &log, "wild");

        emitter.emit(WILDCARD_HOOK, vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["wild:[]"]);
    }

    #[tokio::test]
    async fn test_callbacks_run_in_registration_order() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["1", "2", "3"] {
            recorder(&emitter, "test", &log, tag);
        }

        emitter.emit("test", vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["1:[]", "2:[]", "3:[]"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_only_that_callback() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&emitter, "test", &log, "first");
        recorder(&emitter, "test", &log, "second");

        first.unsubscribe();
        first.unsubscribe();
        emitter.emit("test", vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["second:[]"]);
        assert_eq!(emitter.subscriber_count("test"), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_after_unsubscribe_all() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sub = recorder(&emitter, "test", &log, "a");
        recorder(&emitter, "test", &log, "b");

        emitter.unsubscribe_all("test");
        sub.unsubscribe();
        emitter.emit("test", vec![]).await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(emitter.subscriber_count("test"), 0);
    }

    #[tokio::test]
    async fn test_stale_handle_does_not_remove_new_subscription() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let stale = recorder(&emitter, "test", &log, "old");
        emitter.unsubscribe_all("test");
        recorder(&emitter, "test", &log, "new");

        stale.unsubscribe();
        emitter.emit("test", vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["new:[]"]);
    }

    async fn explode() -> anyhow::Result<()> {
        panic!("async boom")
    }

    #[tokio::test]
    async fn test_failing_callbacks_are_isolated() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        emitter.subscribe_sync("test", |_| Err(anyhow::anyhow!("boom")));
        emitter.subscribe("test", |_| explode());
        emitter.subscribe_sync("test", |_| panic!("sync boom"));
        recorder(&emitter, "test", &log, "survivor");

        emitter.emit("test", vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["survivor:[]"]);
    }

    #[tokio::test]
    async fn test_callbacks_are_awaited_sequentially() {
        let emitter = Emitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let slow_log = log.clone();
        emitter.subscribe("test", move |_| {
            let log = slow_log.clone();
            async move {
                tokio::task::yield_now().await;
                log.lock().unwrap().push("slow".to_string());
                Ok(())
            }
        });
        recorder(&emitter, "test", &log, "fast");

        emitter.emit("test", vec![]).await;

        assert_eq!(*log.lock().unwrap(), vec!["slow", "fast:[]"]);
    }

    #[test]
    fn test_subscription_ids_are_ascending() {
        let emitter = Emitter::new();
        let a = emitter.subscribe_sync("a", |_| Ok(()));
        let b = emitter.subscribe_sync("b", |_| Ok(()));
        assert!(b.id() > a.id());
        assert_eq!(a.hook_name(), "a");
    }
}
