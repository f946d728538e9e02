use crate::model::Node;

const BASE_IMPORTS: &[&str] = &[
    "import torch",
    "import torch.nn as nn",
    "import torch.optim as optim",
    "import torchvision.transforms as transforms",
    "from torch.utils.data import DataLoader",
];

// Порядок здесь определяет порядок вывода
const CONDITIONAL_IMPORTS: &[(&[&str], &str)] = &[
    (&["dataLoader", "imageInput"], "import torchvision.datasets as datasets"),
    (&["visualize"], "import matplotlib.pyplot as plt"),
];

pub fn resolve_imports(nodes: &[Node]) -> String {
    let mut lines = BASE_IMPORTS.to_vec();
    for (kinds, line) in CONDITIONAL_IMPORTS {
        if nodes.iter().any(|n| kinds.contains(&n.kind.as_str())) {
            lines.push(*line);
        }
    }
    lines.join("\n")
}
