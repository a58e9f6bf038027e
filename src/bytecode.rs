//! The opaque input handle the verifier receives from its producer.

/// A `(data, len)` blob handed to the verifier by whatever external
/// collaborator produced it (a controller process, in the system this
/// crate is one component of). `descriptor` is threaded through untouched
/// for the eventual executor's benefit; the verifier never inspects it.
#[derive(Debug, Clone)]
pub struct Bytecode<D = ()> {
    data: Vec<u8>,
    descriptor: D,
}

impl<D> Bytecode<D> {
    pub fn new(data: Vec<u8>, descriptor: D) -> Self {
        Self { data, descriptor }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    pub fn into_descriptor(self) -> D {
        self.descriptor
    }
}

impl From<Vec<u8>> for Bytecode<()> {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data, ())
    }
}
