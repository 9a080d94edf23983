use crate::error::{StageFailure, StageName};
use crate::generator::context::GeneratorContext;

/// 流水线阶段：显式的输入输出类型
#[allow(async_fn_in_trait)]
pub trait Stage {
    type Input;
    type Output;

    fn name(&self) -> StageName;

    async fn execute(
        &self,
        context: &GeneratorContext,
        input: &Self::Input,
    ) -> Result<Self::Output, StageFailure>;
}
