//! The step algebra
//!
//! A [`Step`] turns one [`PipelineOutput`] into zero or more outputs. Steps
//! compose through a handful of combinators:
//!
//! - [`PassThrough`] returns its input unchanged
//! - [`Then`] feeds every output of one step, in order, to the next
//! - [`And`] runs several steps concurrently on the same input and
//!   concatenates their outputs in declaration order
//! - [`Or`] tries steps in order and stops at the first non-empty result
//! - [`IfElse`] picks one of two steps with an async predicate
//! - [`SideEffect`] performs an action and passes its input through
//! - [`Described`] overrides the description of a wrapped step
//!
//! Pipelines are assembled once, before execution, and shared behind `Arc`.

use crate::domain::{FigportError, Instruction, PipelineOutput, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Shared handle to a step
pub type StepRef = Arc<dyn Step>;

/// One stage of an import pipeline
///
/// Steps run concurrently with other steps and other instructions. Anything
/// that touches a shared resource must do its own locking; see
/// [`PathLockRegistry`](super::PathLockRegistry).
#[async_trait]
pub trait Step: Send + Sync {
    /// Process one input
    ///
    /// An empty result ends this branch of the pipeline. Prefer deriving
    /// outputs from a clone of `input` so earlier naming adjustments survive.
    ///
    /// # Errors
    ///
    /// Any error aborts the owning instruction's pipeline.
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>>;

    /// Human-readable description used in logs
    fn describe(&self) -> String;

    /// Whether composing with this step can skip it entirely
    fn is_pass_through(&self) -> bool {
        false
    }
}

impl fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl Step for PassThrough {
    async fn process(
        &self,
        _instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        Ok(input.clone().single())
    }

    fn describe(&self) -> String {
        "PassThrough".to_string()
    }

    fn is_pass_through(&self) -> bool {
        true
    }
}

pub fn pass_through() -> StepRef {
    Arc::new(PassThrough)
}

/// Runs `second` on every output of `first`, one at a time, in order
pub struct Then {
    first: StepRef,
    second: StepRef,
}

impl Then {
    pub fn new(first: StepRef, second: StepRef) -> Self {
        Self { first, second }
    }
}

#[async_trait]
impl Step for Then {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        let intermediate = self.first.process(instruction, input).await?;

        let mut outputs = Vec::new();
        for output in &intermediate {
            outputs.extend(self.second.process(instruction, output).await?);
        }
        Ok(outputs)
    }

    fn describe(&self) -> String {
        format!("{} THEN {}", self.first.describe(), self.second.describe())
    }
}

/// Runs every step concurrently on the same input
///
/// Each child runs as its own task in a [`JoinSet`]. The first failure aborts
/// the children still running and is returned; dropping an `And` future
/// mid-flight aborts them as well.
pub struct And {
    steps: Vec<StepRef>,
}

impl And {
    pub fn new(steps: Vec<StepRef>) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl Step for And {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        let mut tasks = JoinSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            let step = Arc::clone(step);
            let instruction = instruction.clone();
            let input = input.clone();
            tasks.spawn(async move { (index, step.process(&instruction, &input).await) });
        }

        let mut results: Vec<Option<Vec<PipelineOutput>>> = vec![None; self.steps.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(outputs))) => results[index] = Some(outputs),
                Ok((index, Err(error))) => {
                    tasks.abort_all();
                    tracing::debug!(
                        branch = index,
                        error = %error,
                        "Branch failed, cancelling siblings"
                    );
                    return Err(error);
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(FigportError::Pipeline(format!(
                        "Concurrent step did not complete: {join_error}"
                    )));
                }
            }
        }

        Ok(results.into_iter().flatten().flatten().collect())
    }

    fn describe(&self) -> String {
        let parts = self
            .steps
            .iter()
            .map(|step| format!("({})", step.describe()))
            .collect::<Vec<_>>();
        format!("({})", parts.join(" AND "))
    }
}

/// Tries steps in order; the first non-empty result wins
///
/// Steps after the winner are never started. Errors propagate immediately.
pub struct Or {
    steps: Vec<StepRef>,
}

impl Or {
    pub fn new(steps: Vec<StepRef>) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl Step for Or {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        for step in &self.steps {
            let outputs = step.process(instruction, input).await?;
            if !outputs.is_empty() {
                return Ok(outputs);
            }
        }
        Ok(PipelineOutput::none())
    }

    fn describe(&self) -> String {
        let parts = self
            .steps
            .iter()
            .map(|step| format!("({})", step.describe()))
            .collect::<Vec<_>>();
        format!("({})", parts.join(" OR "))
    }
}

/// Condition evaluated by [`IfElse`]
///
/// Implemented for plain closures over the instruction and input.
#[async_trait]
pub trait Predicate: Send + Sync {
    async fn test(&self, instruction: &Instruction, input: &PipelineOutput) -> bool;
}

#[async_trait]
impl<F> Predicate for F
where
    F: Fn(&Instruction, &PipelineOutput) -> bool + Send + Sync,
{
    async fn test(&self, instruction: &Instruction, input: &PipelineOutput) -> bool {
        self(instruction, input)
    }
}

/// Runs `step` when the predicate holds, `otherwise` when it doesn't
pub struct IfElse {
    label: String,
    predicate: Arc<dyn Predicate>,
    step: StepRef,
    otherwise: StepRef,
}

impl IfElse {
    pub fn new(
        label: impl Into<String>,
        predicate: Arc<dyn Predicate>,
        step: StepRef,
        otherwise: StepRef,
    ) -> Self {
        Self {
            label: label.into(),
            predicate,
            step,
            otherwise,
        }
    }
}

#[async_trait]
impl Step for IfElse {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        if self.predicate.test(instruction, input).await {
            self.step.process(instruction, input).await
        } else {
            self.otherwise.process(instruction, input).await
        }
    }

    fn describe(&self) -> String {
        format!(
            "IF {} THEN {} ELSE {}",
            self.label,
            self.step.describe(),
            self.otherwise.describe()
        )
    }
}

/// `IfElse` with a closure predicate; `otherwise` defaults to pass-through
pub fn if_else<P>(
    label: impl Into<String>,
    predicate: P,
    step: StepRef,
    otherwise: Option<StepRef>,
) -> StepRef
where
    P: Predicate + 'static,
{
    Arc::new(IfElse::new(
        label,
        Arc::new(predicate),
        step,
        otherwise.unwrap_or_else(pass_through),
    ))
}

/// Action performed by a [`SideEffect`]
#[async_trait]
pub trait Action: Send + Sync {
    async fn perform(&self, instruction: &Instruction, input: &PipelineOutput) -> Result<()>;
}

#[async_trait]
impl<F> Action for F
where
    F: Fn(&Instruction, &PipelineOutput) -> Result<()> + Send + Sync,
{
    async fn perform(&self, instruction: &Instruction, input: &PipelineOutput) -> Result<()> {
        self(instruction, input)
    }
}

/// Performs an action, then passes its input through unchanged
///
/// Action failures propagate.
pub struct SideEffect {
    description: Option<String>,
    action: Arc<dyn Action>,
}

impl SideEffect {
    pub fn new(description: Option<String>, action: Arc<dyn Action>) -> Self {
        Self {
            description,
            action,
        }
    }
}

#[async_trait]
impl Step for SideEffect {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        self.action.perform(instruction, input).await?;
        Ok(input.clone().single())
    }

    fn describe(&self) -> String {
        match &self.description {
            Some(description) => format!("SideEffect: {description}"),
            None => "SideEffect".to_string(),
        }
    }
}

pub fn side_effect<A>(description: Option<&str>, action: A) -> StepRef
where
    A: Action + 'static,
{
    Arc::new(SideEffect::new(
        description.map(str::to_string),
        Arc::new(action),
    ))
}

/// Wraps a step with a custom description
pub struct Described {
    description: String,
    step: StepRef,
}

impl Described {
    pub fn new(description: impl Into<String>, step: StepRef) -> Self {
        Self {
            description: description.into(),
            step,
        }
    }
}

#[async_trait]
impl Step for Described {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        self.step.process(instruction, input).await
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub fn described(description: impl Into<String>, step: StepRef) -> StepRef {
    Arc::new(Described::new(description, step))
}

type TransformFn =
    dyn Fn(&Instruction, &PipelineOutput) -> Result<Vec<PipelineOutput>> + Send + Sync;

/// Synchronous step built from a closure
pub struct Transform {
    description: String,
    transform: Box<TransformFn>,
}

#[async_trait]
impl Step for Transform {
    async fn process(
        &self,
        instruction: &Instruction,
        input: &PipelineOutput,
    ) -> Result<Vec<PipelineOutput>> {
        (self.transform)(instruction, input)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub fn transform<F>(description: impl Into<String>, transform: F) -> StepRef
where
    F: Fn(&Instruction, &PipelineOutput) -> Result<Vec<PipelineOutput>> + Send + Sync + 'static,
{
    Arc::new(Transform {
        description: description.into(),
        transform: Box::new(transform),
    })
}

fn resolve(
    first: StepRef,
    second: StepRef,
    neither: impl FnOnce(StepRef, StepRef) -> StepRef,
) -> StepRef {
    if first.is_pass_through() {
        second
    } else if second.is_pass_through() {
        first
    } else {
        neither(first, second)
    }
}

/// Composition operators; pass-through operands are dropped
///
/// ```
/// use figport::core::pipeline::{pass_through, Destination, StepExt};
/// use std::sync::Arc;
///
/// let write = Arc::new(Destination::None) as figport::core::pipeline::StepRef;
/// let pipeline = pass_through().then(write);
/// assert_eq!(pipeline.describe(), "Destination.none");
/// ```
pub trait StepExt {
    fn then(self, next: StepRef) -> StepRef;
    fn and(self, other: StepRef) -> StepRef;
    fn or(self, other: StepRef) -> StepRef;
}

impl StepExt for StepRef {
    fn then(self, next: StepRef) -> StepRef {
        resolve(self, next, |first, second| Arc::new(Then::new(first, second)))
    }

    fn and(self, other: StepRef) -> StepRef {
        resolve(self, other, |first, second| {
            Arc::new(And::new(vec![first, second]))
        })
    }

    fn or(self, other: StepRef) -> StepRef {
        resolve(self, other, |first, second| {
            Arc::new(Or::new(vec![first, second]))
        })
    }
}

/// Chains steps with [`Then`]
pub fn sequence(steps: Vec<StepRef>) -> StepRef {
    match steps.len() {
        0 => pass_through(),
        1 => steps.into_iter().next().unwrap_or_else(pass_through),
        _ => steps.into_iter().fold(pass_through(), StepExt::then),
    }
}

/// Runs steps concurrently with [`And`]
pub fn all(steps: Vec<StepRef>) -> StepRef {
    match steps.len() {
        0 => pass_through(),
        1 => steps.into_iter().next().unwrap_or_else(pass_through),
        _ => Arc::new(And::new(steps)),
    }
}

/// Ordered fallback with [`Or`]
pub fn any(steps: Vec<StepRef>) -> StepRef {
    match steps.len() {
        0 => pass_through(),
        1 => steps.into_iter().next().unwrap_or_else(pass_through),
        _ => Arc::new(Or::new(steps)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::Destination;

    fn named(name: &str) -> StepRef {
        described(name, pass_through())
    }

    #[test]
    fn test_composition_elides_pass_through() {
        assert_eq!(pass_through().then(named("a")).describe(), "a");
        assert_eq!(named("a").then(pass_through()).describe(), "a");
        assert_eq!(pass_through().and(named("a")).describe(), "a");
        assert_eq!(named("a").or(pass_through()).describe(), "a");
        assert!(pass_through().then(pass_through()).is_pass_through());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(named("a").then(named("b")).describe(), "a THEN b");
        assert_eq!(named("a").and(named("b")).describe(), "((a) AND (b))");
        assert_eq!(named("a").or(named("b")).describe(), "((a) OR (b))");
        assert_eq!(
            if_else("is_svg", |_: &Instruction, _: &PipelineOutput| true, named("a"), None)
                .describe(),
            "IF is_svg THEN a ELSE PassThrough"
        );
        assert_eq!(
            side_effect(Some("log"), |_: &Instruction, _: &PipelineOutput| Ok(())).describe(),
            "SideEffect: log"
        );
    }

    #[test]
    fn test_list_helpers() {
        assert!(sequence(vec![]).is_pass_through());
        assert!(all(vec![]).is_pass_through());
        assert!(any(vec![]).is_pass_through());

        assert_eq!(all(vec![named("a")]).describe(), "a");
        assert_eq!(any(vec![named("a")]).describe(), "a");
        assert_eq!(
            sequence(vec![named("a"), named("b"), named("c")]).describe(),
            "a THEN b THEN c"
        );
        assert_eq!(
            all(vec![named("a"), named("b"), named("c")]).describe(),
            "((a) AND (b) AND (c))"
        );
    }

    #[test]
    fn test_described_pass_through_is_not_elided() {
        let step = named("a").then(Arc::new(Destination::None));
        assert_eq!(step.describe(), "a THEN Destination.none");
    }
}
