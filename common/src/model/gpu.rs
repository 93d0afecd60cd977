use anyhow::bail;

/// A GPU attached to a node. Carried through the inventory for reporting;
/// the pipeline core itself never inspects these.
#[derive(Debug, Clone, PartialEq)]
pub struct Gpu {
    pub id: String,
    pub model: String,
    pub memory_bytes: Option<u64>,
}

impl Gpu {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.memory_bytes == Some(0) {
            bail!("GPU '{}': memory size must be a positive integer", self.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_memory_is_rejected() {
        let gpu = Gpu {
            id: "gpu0".into(),
            model: "H100".into(),
            memory_bytes: Some(0),
        };
        assert!(gpu.validate().is_err());

        let gpu = Gpu {
            memory_bytes: None,
            ..gpu
        };
        assert!(gpu.validate().is_ok());
    }
}
