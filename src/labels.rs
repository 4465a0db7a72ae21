/// The fixed CIFAR-10 class labels, indexed by the classifier's output
/// class index. Built once at startup and shared read-only with the loop.
#[derive(Debug)]
pub struct LabelTable {
    labels: Vec<String>,
}

const CIFAR10_LABELS: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

impl LabelTable {
    pub fn cifar10() -> Self {
        Self {
            labels: CIFAR10_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
