use crate::dataset::RatingDataset;

/// One train/test partition over rating positions
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Fold {
    pub fn train_set(&self, dataset: &RatingDataset) -> RatingDataset {
        dataset.subset(&self.train)
    }

    pub fn test_set(&self, dataset: &RatingDataset) -> RatingDataset {
        dataset.subset(&self.test)
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
