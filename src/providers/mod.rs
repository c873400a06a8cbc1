pub mod huaweicloud;
pub mod tencentcloud;

mod sign;

use crate::error::Error;
use crate::registry::BackendRegistry;

/// Register every built-in backend type. Called once at startup, before any
/// backend is constructed.
pub fn register_builtin(registry: &mut BackendRegistry) -> Result<(), Error> {
    registry.register(huaweicloud::TYPE_ID, huaweicloud::build)?;
    registry.register(tencentcloud::TYPE_ID, tencentcloud::build)?;
    Ok(())
}
