// Host paths, relative to the project root
pub const DIST_RELATIVE_PATH: &str = "crossbox/dist";
pub const TMP_RELATIVE_PATH: &str = "crossbox/tmp";
pub const CACHE_DIR_NAME: &str = "crossbox";
pub const DEFAULT_ICON: &str = "Icon.png";

// Container paths
pub const WORK_DIR_CONTAINER: &str = "/app";
pub const CACHE_DIR_CONTAINER: &str = "/go";
pub const GO_CACHE_DIR_NAME: &str = "go-build";

// Mount names
pub const CACHE_MOUNT: &str = "cache";
pub const PROJECT_MOUNT: &str = "project";

// Target operating systems
pub const ANDROID_OS: &str = "android";
pub const FREEBSD_OS: &str = "freebsd";
pub const LINUX_OS: &str = "linux";
pub const WINDOWS_OS: &str = "windows";

// Engines
pub const DOCKER_ENGINE: &str = "docker";
pub const PODMAN_ENGINE: &str = "podman";

// Crossbox vars
pub const CB_ARCH: &str = "CB_ARCH";
pub const CB_CACHE_DIR: &str = "CB_CACHE_DIR";
pub const CB_ENGINE: &str = "CB_ENGINE";
pub const CB_IMAGE: &str = "CB_IMAGE";
pub const CB_PULL: &str = "CB_PULL";

// Build env vars
pub const CC: &str = "CC";
pub const CGO_ENABLED: &str = "CGO_ENABLED";
pub const GOARCH: &str = "GOARCH";
pub const GOARM: &str = "GOARM";
pub const GOCACHE: &str = "GOCACHE";
pub const GOFLAGS: &str = "GOFLAGS";
pub const GOOS: &str = "GOOS";
pub const USE_PODMAN: &str = "use_podman";

// Images
pub const ANDROID_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-android";
pub const FREEBSD_AMD64_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-freebsd-amd64";
pub const FREEBSD_ARM64_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-freebsd-arm64";
pub const LINUX_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-base";
pub const LINUX_386_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-linux-386";
pub const LINUX_ARM64_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-linux-arm64";
pub const LINUX_ARM_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-linux-arm";
pub const WINDOWS_IMAGE: &str = "docker.io/fyneio/fyne-cross:1.2-windows";

// Entrypoint used to remap the container user to the host user
pub const FIXUID_ENTRYPOINT: &str = "fixuid";
