//! RecordId を生成する IdGenerator の標準実装（Clock + シーケンス + プロセスごとの salt）

use crate::domain::RecordId;
use crate::ports::outbound::{Clock, IdGenerator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const EPOCH_MS: u64 = 1577836800000; // 2020-01-01 00:00:00 UTC
const SEQ_BITS: u32 = 8;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1; // 0..255
/// シーケンス込みのカウンタが u64 に収まる上限（約 228 万年）
const MAX_MS_REL: u64 = u64::MAX >> SEQ_BITS;
const SALT_BITS: u32 = 16;
const BASE: u128 = 62;
/// 62^14 > 2^80 なので (カウンタ << 16 | salt) は切り詰めずに表せる
const WIDTH: usize = 14;

/// 0-9, A-Z, a-z の順で辞書順＝数値順になるbase62
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Clock + シーケンスで RecordId を生成する標準実装
///
/// 上位は (経過ミリ秒 << 8 | シーケンス) のカウンタで、同一ミリ秒内は単調増加させる。
/// 下位 16 bit はプロセスごとの salt で、別プロセスが同じミリ秒に採番しても衝突しにくくする。
pub struct StdIdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicU64,
    salt: u16,
}

impl StdIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_salt(clock, rand::random())
    }

    /// salt を固定して作成する
    pub fn with_salt(clock: Arc<dyn Clock>, salt: u16) -> Self {
        Self {
            clock,
            last: AtomicU64::new(0),
            salt,
        }
    }

    fn next_counter(&self) -> u64 {
        let ms_rel = self.clock.now_ms().saturating_sub(EPOCH_MS).min(MAX_MS_REL);
        let base = ms_rel << SEQ_BITS;

        loop {
            let prev = self.last.load(Ordering::SeqCst);
            let next = if (prev >> SEQ_BITS) < ms_rel {
                base
            } else {
                // 同一ミリ秒内（または時計が戻った）: シーケンスを使い切ると次のミリ秒の枠へ繰り上がる
                prev.saturating_add(1)
            };
            if self
                .last
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }
}

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> RecordId {
        let counter = self.next_counter();
        let value = ((counter as u128) << SALT_BITS) | self.salt as u128;
        RecordId::new(to_base62(value))
    }
}

fn to_base62(mut n: u128) -> String {
    let mut buf = [b'0'; WIDTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }
    buf.iter().map(|&b| b as char).collect()
}
