use bon::Builder;

/// Options for a single container run.
#[derive(Debug, Default, Clone, Copy, Builder)]
pub struct RunOpts<'scope> {
    /// Container working directory, defaults to the
    /// volume's work dir.
    pub workdir: Option<&'scope str>,
}
