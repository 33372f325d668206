//! Pipeline outputs: the data passed between pipeline steps

use super::target::ImportTargetOverride;

/// Byte payload plus the naming adjustments accumulated so far
///
/// A step may return zero outputs (the branch ends, e.g. after a write), one
/// output (the common case) or many (fan-out). When producing outputs from an
/// input prefer the `with_*` helpers on a clone of the input over building a
/// new value, so adjustments made by earlier steps are carried along.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub data: Vec<u8>,
    pub target: ImportTargetOverride,
}

impl PipelineOutput {
    pub fn new(data: Vec<u8>, target: ImportTargetOverride) -> Self {
        Self { data, target }
    }

    /// Wraps this output as a one-element result
    pub fn single(self) -> Vec<PipelineOutput> {
        vec![self]
    }

    /// The empty result
    pub fn none() -> Vec<PipelineOutput> {
        Vec::new()
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.target.output_name = Some(output_name.into());
        self
    }

    pub fn with_path_elements(mut self, path_elements: Vec<String>) -> Self {
        self.target.path_elements = path_elements;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.target.format = Some(format.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_content() {
        let a = PipelineOutput::new(vec![1, 2, 3], ImportTargetOverride::default());
        let b = PipelineOutput::new(vec![1, 2, 3], ImportTargetOverride::default());
        assert_eq!(a, b);

        let c = b.clone().with_output_name("other");
        assert_ne!(a, c);
        let d = a.clone().with_data(vec![1, 2]);
        assert_ne!(a, d);
    }

    #[test]
    fn test_single_and_none() {
        let output = PipelineOutput::default();
        assert_eq!(output.clone().single(), vec![output]);
        assert!(PipelineOutput::none().is_empty());
    }
}
