//! Chain access: RPC reads and submission, plus off-chain balance stand-ins

pub mod balances;
pub mod rpc_client;

pub use balances::FixedBalances;
pub use rpc_client::SolanaRpcClient;
