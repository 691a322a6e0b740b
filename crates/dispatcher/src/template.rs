use crate::JsonMap;

/// 配置模板合并工具
pub struct TemplateMerger;

impl TemplateMerger {
    /// 基于模板构建请求：拷贝模板，再用非空的动态参数覆盖或补充字段。
    ///
    /// 动态参数中的 `null` 不会删除模板字段。返回全新的对象，`template` 保持不变，
    /// 同一配置行被并发推送复用时互不影响。
    pub fn merge(template: &JsonMap, overrides: &JsonMap) -> JsonMap {
        let mut result = template.clone();
        for (key, value) in overrides {
            if !value.is_null() {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }
}
