// Transport header keys

/// Names the argument scheme used to interpret `arg2` and `arg3`.
pub const ARG_SCHEME_KEY: &str = "as";

/// Name of the calling service.
pub const CALLER_NAME_KEY: &str = "cn";

/// Retry flags for the call (e.g. `"c"`, `"t"`, `"n"`).
pub const RETRY_FLAGS_KEY: &str = "re";

/// Number of nodes to speculatively execute the call on.
pub const SPECULATIVE_EXECUTION_KEY: &str = "se";

/// Failure domain of the call, used by retry policies.
pub const FAILURE_DOMAIN_KEY: &str = "fd";

/// Key used by sharded services to route the call.
pub const SHARD_KEY: &str = "sk";

/// Service name to route through instead of `service`.
pub const ROUTING_DELEGATE_KEY: &str = "rd";
