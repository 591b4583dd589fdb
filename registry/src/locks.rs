//! 名前空間ごとの排他制御
//!
//! - 書き込みロック: 登録時のread-modify-writeとリフレッシュの上書きを直列化する
//! - リフレッシュゲート: 同じ名前空間のフルリフレッシュを同時に1つに制限する

use prover_registry_common::types::Network;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct NamespaceLock {
    write: Mutex<()>,
    refresh: Mutex<()>,
}

/// 名前空間ロック
#[derive(Clone)]
pub struct NamespaceLocks {
    locks: Arc<HashMap<Network, NamespaceLock>>,
}

impl NamespaceLocks {
    /// 全ネットワーク分のロックを作成
    pub fn new() -> Self {
        let locks = Network::ALL
            .iter()
            .map(|network| (*network, NamespaceLock::default()))
            .collect();
        Self {
            locks: Arc::new(locks),
        }
    }

    fn get(&self, network: Network) -> &NamespaceLock {
        // ALLの全要素を登録済み
        &self.locks[&network]
    }

    /// 書き込みロックを取得
    pub async fn write(&self, network: Network) -> MutexGuard<'_, ()> {
        self.get(network).write.lock().await
    }

    /// リフレッシュゲートを取得（実行中のリフレッシュがあれば完了まで待つ）
    pub async fn refresh(&self, network: Network) -> MutexGuard<'_, ()> {
        self.get(network).refresh.lock().await
    }

    /// リフレッシュゲートを待たずに取得（実行中なら`None`）
    pub fn try_refresh(&self, network: Network) -> Option<MutexGuard<'_, ()>> {
        self.get(network).refresh.try_lock().ok()
    }
}

impl Default for NamespaceLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_refresh_is_exclusive_per_network() {
        let locks = NamespaceLocks::new();

        let guard = locks.try_refresh(Network::Mainnet);
        assert!(guard.is_some());
        assert!(locks.try_refresh(Network::Mainnet).is_none());
        assert!(locks.try_refresh(Network::Testnet).is_some());

        drop(guard);
        assert!(locks.try_refresh(Network::Mainnet).is_some());
    }

    #[tokio::test]
    async fn test_clones_share_locks() {
        let locks = NamespaceLocks::new();
        let other = locks.clone();

        let _guard = locks.write(Network::Testnet).await;
        assert!(other.get(Network::Testnet).write.try_lock().is_err());
    }
}
