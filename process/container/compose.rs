use std::path::PathBuf;

/// A host directory bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host: PathBuf,
    pub container: String,
}

/// Builds one `-v host:container:z` pair per mount, in the given order.
///
/// The `z` option asks SELinux hosts to relabel the directory so the
/// container can use it. Engines on hosts without labeling ignore it.
pub fn mount_flags<'a, I>(mounts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Mount>,
{
    mounts
        .into_iter()
        .flat_map(|mount| {
            [
                "-v".to_string(),
                format!("{}:{}:z", mount.host.display(), mount.container),
            ]
        })
        .collect()
}

/// Builds one `-e NAME=VALUE` pair per variable, in the given order.
///
/// With `quote_needed` a token whose value contains `=` is quoted as a
/// whole, otherwise the engine splits it on the wrong `=`.
pub fn env_flags<'a, I, K, V>(vars: I, quote_needed: bool) -> Vec<String>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    vars.into_iter()
        .flat_map(|(name, value)| {
            let (name, value) = (name.as_ref(), value.as_ref());
            let env = format!("{name}={value}");
            let env = if quote_needed && value.contains('=') {
                format!("{env:?}")
            } else {
                env
            };
            ["-e".to_string(), env]
        })
        .collect()
}
