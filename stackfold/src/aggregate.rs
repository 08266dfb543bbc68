use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::model::{Arg, Args, Call, Goroutine, Signature, Stack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SimilarityPolicy {
    ExactFlags,
    ExactLines,
    AnyPointer,
    AnyValue,
}

impl Signature {
    pub fn similar(&self, other: &Signature, policy: SimilarityPolicy) -> bool {
        if self.state != other.state || self.locked_to_thread != other.locked_to_thread {
            return false;
        }
        let sleep_matters = policy != SimilarityPolicy::AnyValue;
        if sleep_matters && (self.sleep_min != other.sleep_min || self.sleep_max != other.sleep_max)
        {
            return false;
        }
        stack_similar(&self.stack, &other.stack, policy)
            && stack_similar(&self.created_by, &other.created_by, policy)
    }

    // Strict total order used for stable presentation: shallower stacks
    // first, then frame-by-frame function names, then scheduler state.
    pub fn cmp_display(&self, other: &Signature) -> Ordering {
        self.stack
            .calls
            .len()
            .cmp(&other.stack.calls.len())
            .then_with(|| {
                self.stack
                    .calls
                    .iter()
                    .map(|call| call.func.complete.as_str())
                    .cmp(other.stack.calls.iter().map(|call| call.func.complete.as_str()))
            })
            .then_with(|| self.state.cmp(&other.state))
    }

    pub fn less(&self, other: &Signature) -> bool {
        self.cmp_display(other) == Ordering::Less
    }
}

pub fn aggregate(goroutines: &[Goroutine], policy: SimilarityPolicy) -> Vec<Goroutine> {
    let mut grouped: Vec<Goroutine> = Vec::new();
    for goroutine in goroutines {
        match grouped
            .iter_mut()
            .find(|rep| rep.signature.similar(&goroutine.signature, policy))
        {
            Some(rep) => {
                rep.count += goroutine.count;
                if policy == SimilarityPolicy::AnyValue {
                    rep.signature.sleep_min =
                        rep.signature.sleep_min.min(goroutine.signature.sleep_min);
                    rep.signature.sleep_max =
                        rep.signature.sleep_max.max(goroutine.signature.sleep_max);
                }
            }
            None => grouped.push(goroutine.clone()),
        }
    }
    grouped.sort_by(|a, b| a.signature.cmp_display(&b.signature));
    grouped
}

fn stack_similar(a: &Stack, b: &Stack, policy: SimilarityPolicy) -> bool {
    a.elided == b.elided
        && a.calls.len() == b.calls.len()
        && a.calls
            .iter()
            .zip(&b.calls)
            .all(|(x, y)| call_similar(x, y, policy))
}

fn call_similar(a: &Call, b: &Call, policy: SimilarityPolicy) -> bool {
    a.func == b.func
        && a.remote_src_path == b.remote_src_path
        && a.line == b.line
        && args_similar(&a.args, &b.args, policy)
}

fn args_similar(a: &Args, b: &Args, policy: SimilarityPolicy) -> bool {
    if a.elided != b.elided || a.values.len() != b.values.len() {
        return false;
    }
    match policy {
        SimilarityPolicy::ExactFlags => a
            .values
            .iter()
            .zip(&b.values)
            .all(|(x, y)| x == y || (x.is_ptr() && y.is_ptr())),
        SimilarityPolicy::ExactLines => a
            .values
            .iter()
            .zip(&b.values)
            .all(|(x, y)| match (x, y) {
                (Arg::Value(_), Arg::Value(_)) => true,
                _ => x == y,
            }),
        SimilarityPolicy::AnyPointer | SimilarityPolicy::AnyValue => true,
    }
}
