//! 并发控制工具

use futures::stream::{self, StreamExt};
use std::future::Future;

/// 以限定并行度执行一组Future，按输入顺序返回全部结果
///
/// 所有任务都会被执行完毕后才返回，单个任务的成败由调用方
/// 在返回值里自行判定。
pub async fn do_parallel_with_limit<F>(futures: Vec<F>, limit: usize) -> Vec<F::Output>
where
    F: Future,
{
    stream::iter(futures).buffered(limit.max(1)).collect().await
}
