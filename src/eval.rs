//! The evaluator and the [`PineVm`] that owns its mutable state (§4.3, §6).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::cache::ApplicationCache;
use crate::error::{PineError, ResultExt};
use crate::expr::{decode_expression, Expr};
use crate::kernel;
use crate::value::Value;

/// Default cache-write threshold, copied from the source implementation's
/// heuristic (§4.3, flagged as an open question in §9) and made
/// configurable here rather than hard-coded.
pub const DEFAULT_CACHE_WRITE_THRESHOLD: Duration = Duration::from_millis(4);

/// Default recursion ceiling for nested `DecodeAndEvaluate` / `List`
/// evaluation. Not part of the specification's semantics — it exists only
/// to turn infinite reflective loops into a catchable `Internal` error
/// instead of a host stack overflow.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 10_000;

/// Construction-time configuration for a [`PineVm`]. Immutable for the
/// lifetime of the VM once built (§3 "Lifecycle").
pub struct VmConfig {
    pub cache_write_threshold: Duration,
    pub max_recursion_depth: usize,
    /// Optional decode-override table: specific encoded function values are
    /// mapped straight to a `Delegating` expression instead of being decoded
    /// normally (§4.3, §6).
    pub decode_overrides: HashMap<Value, Expr>,
    /// Cooperative cancellation hook, polled once per `evaluate` dispatch
    /// (§5). Returning `true` aborts evaluation with `ErrorKind::Cancelled`.
    pub cancel_hook: Option<Rc<dyn Fn() -> bool>>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            cache_write_threshold: DEFAULT_CACHE_WRITE_THRESHOLD,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            decode_overrides: HashMap::new(),
            cancel_hook: None,
        }
    }
}

/// A single Pine VM instance: the evaluator plus the cache it owns for its
/// lifetime (§3, §5 — "Multiple VM instances may run in parallel, each
/// owning an independent cache").
pub struct PineVm {
    config: VmConfig,
    cache: RefCell<ApplicationCache>,
    max_env_size: Cell<usize>,
}

impl PineVm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(ApplicationCache::new()),
            max_env_size: Cell::new(0),
        }
    }

    /// The central entry point (§6): reduce `expr` to a value under `env`.
    pub fn evaluate(&self, expr: &Expr, env: &Value) -> Result<Value, PineError> {
        self.track_env_size(env);
        self.eval_inner(expr, env, 0)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn cache_lookup_count(&self) -> u64 {
        self.cache.borrow().lookup_count()
    }

    pub fn max_env_size(&self) -> usize {
        self.max_env_size.get()
    }

    pub fn max_observed_cache_argument_len(&self) -> usize {
        self.cache.borrow().max_argument_len()
    }

    fn track_env_size(&self, env: &Value) {
        if let Value::List(items) = env {
            self.max_env_size.set(self.max_env_size.get().max(items.len()));
        }
    }

    fn check_cancelled(&self) -> Result<(), PineError> {
        if let Some(hook) = &self.config.cancel_hook {
            if hook() {
                return Err(PineError::cancelled());
            }
        }
        Ok(())
    }

    fn eval_inner(&self, expr: &Expr, env: &Value, depth: usize) -> Result<Value, PineError> {
        if depth > self.config.max_recursion_depth {
            return Err(PineError::internal("recursion limit exceeded"));
        }
        self.check_cancelled()?;

        match expr {
            Expr::Literal(v) => Ok(v.clone()),

            Expr::List(items) => {
                let mut results = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let v = self
                        .eval_inner(item, env, depth + 1)
                        .with_context(format!("list element [{i}]"))?;
                    results.push(v);
                }
                Ok(Value::list(results))
            }

            Expr::Environment => Ok(env.clone()),

            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                let c = self
                    .eval_inner(condition, env, depth + 1)
                    .with_context("conditional condition")?;
                if c.is_true() {
                    self.eval_inner(if_true, env, depth + 1)
                } else {
                    self.eval_inner(if_false, env, depth + 1)
                }
            }

            Expr::KernelApplication { function, argument } => {
                let arg = self
                    .eval_inner(argument, env, depth + 1)
                    .with_context("kernel application argument")?;
                kernel::apply(*function, &arg)
                    .with_context(format!("kernel application '{function}'"))
            }

            Expr::DecodeAndEvaluate {
                expression,
                environment,
            } => {
                let fv = self
                    .eval_inner(expression, env, depth + 1)
                    .with_context("decode-and-evaluate expression")?;
                let av = self
                    .eval_inner(environment, env, depth + 1)
                    .with_context("decode-and-evaluate environment")?;

                if let Some(cached) = self.cache.borrow().get(&fv, &av) {
                    return Ok(cached);
                }

                let decoded = self.decode_with_overrides(&fv)?;
                let start = Instant::now();
                let result = self
                    .eval_inner(&decoded, &av, depth + 1)
                    .with_context("decode-and-evaluate body")?;
                if start.elapsed() >= self.config.cache_write_threshold {
                    self.cache.borrow_mut().insert(fv, av, result.clone());
                }
                Ok(result)
            }

            Expr::StringTag(_, tagged) => self.eval_inner(tagged, env, depth + 1),

            Expr::Delegating(f) => f.call(env),
        }
    }

    fn decode_with_overrides(&self, fv: &Value) -> Result<Expr, PineError> {
        if let Some(over_ride) = self.config.decode_overrides.get(fv) {
            return Ok(over_ride.clone());
        }
        decode_expression(fv).with_context("decode-and-evaluate decode")
    }
}

impl Default for PineVm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Delegating;
    use crate::kernel::KernelName;
    use num_bigint::BigInt;

    fn int(n: i64) -> Value {
        Value::from_signed_int(&BigInt::from(n))
    }

    fn int_literal(n: i64) -> Expr {
        Expr::Literal(int(n))
    }

    #[test]
    fn add_int_example_from_spec() {
        let vm = PineVm::new();
        let expr = Expr::kernel_application(
            KernelName::AddInt,
            Expr::List(vec![int_literal(2), int_literal(3)]),
        );
        assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), int(5));
    }

    #[test]
    fn conditional_treats_non_true_as_false() {
        let vm = PineVm::new();
        let true_expr = Expr::Literal(Value::true_value());
        let false_expr = Expr::Literal(Value::false_value());
        let garbage_expr = Expr::Literal(Value::empty_list());

        let cond = Expr::conditional(true_expr, int_literal(1), int_literal(2));
        assert_eq!(vm.evaluate(&cond, &Value::empty_list()).unwrap(), int(1));

        let cond = Expr::conditional(false_expr, int_literal(1), int_literal(2));
        assert_eq!(vm.evaluate(&cond, &Value::empty_list()).unwrap(), int(2));

        let cond = Expr::conditional(garbage_expr, int_literal(1), int_literal(2));
        assert_eq!(vm.evaluate(&cond, &Value::empty_list()).unwrap(), int(2));
    }

    #[test]
    fn environment_expression_yields_the_environment() {
        let vm = PineVm::new();
        let env = Value::list(vec![int(7), int(9)]);
        assert_eq!(vm.evaluate(&Expr::Environment, &env).unwrap(), env);
    }

    #[test]
    fn decode_and_evaluate_runs_the_decoded_function() {
        let vm = PineVm::new();
        let fn_expr = Expr::kernel_application(KernelName::Length, Expr::Environment);
        let fn_value = crate::expr::encode_expression(&fn_expr).unwrap();
        let env = Value::list(vec![int(1), int(2), int(3)]);

        let expr = Expr::decode_and_evaluate(Expr::Literal(fn_value), Expr::Literal(env));
        assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), int(3));
    }

    #[test]
    fn decode_and_evaluate_populates_the_cache_when_slow_enough() {
        let vm = PineVm::with_config(VmConfig {
            cache_write_threshold: Duration::from_secs(0),
            ..VmConfig::default()
        });
        let fn_expr = Expr::kernel_application(KernelName::Length, Expr::Environment);
        let fn_value = crate::expr::encode_expression(&fn_expr).unwrap();
        let env = Value::list(vec![int(1)]);
        let expr = Expr::decode_and_evaluate(Expr::Literal(fn_value), Expr::Literal(env));

        assert_eq!(vm.cache_size(), 0);
        vm.evaluate(&expr, &Value::empty_list()).unwrap();
        assert_eq!(vm.cache_size(), 1);
    }

    #[test]
    fn decode_overrides_short_circuit_with_a_delegating_expression() {
        let marker = int(999);
        let delegate = Expr::Delegating(Delegating::new(|env| Ok(env.clone())));
        let mut overrides = HashMap::new();
        overrides.insert(marker.clone(), delegate);

        let vm = PineVm::with_config(VmConfig {
            decode_overrides: overrides,
            ..VmConfig::default()
        });

        let env = Value::list(vec![int(42)]);
        let expr = Expr::decode_and_evaluate(Expr::Literal(marker), Expr::Literal(env.clone()));
        assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), env);
    }

    #[test]
    fn cancellation_hook_aborts_evaluation() {
        let vm = PineVm::with_config(VmConfig {
            cancel_hook: Some(Rc::new(|| true)),
            ..VmConfig::default()
        });
        let err = vm.evaluate(&int_literal(1), &Value::empty_list()).unwrap_err();
        assert_eq!(*err.kind(), crate::error::ErrorKind::Cancelled);
    }

    #[test]
    fn determinism_repeated_evaluation_yields_equal_results() {
        let vm = PineVm::new();
        let expr = Expr::kernel_application(
            KernelName::MulInt,
            Expr::List(vec![int_literal(6), int_literal(7)]),
        );
        let env = Value::empty_list();
        let first = vm.evaluate(&expr, &env).unwrap();
        for _ in 0..5 {
            assert_eq!(vm.evaluate(&expr, &env).unwrap(), first);
        }
    }
}
