// ==========================================
// 路线表批量导入 - 上下文字段派生
// ==========================================
// Route      = 工作表名
// Branch     = 文件路径中出现的机构代码（CLB > PCF > SWE）
// ServiceDay = 文件路径中出现的星期全称（周一 → 周日，先匹配者胜出）
// ImportID   = 本次运行共享的批次标识
// ==========================================
// 注意: 路径匹配是简单子串查找，不是路径解析
// ==========================================

use crate::domain::context::{ImportContext, ImportId};
use crate::domain::types::{weekday_name, Branch, ServiceDay};

pub struct DerivationService;

impl DerivationService {
    /// 从文件路径派生机构代码
    pub fn derive_branch(&self, file_path: &str) -> Branch {
        Branch::PRIORITY
            .into_iter()
            .find(|b| file_path.contains(b.code()))
            .unwrap_or(Branch::Unknown)
    }

    /// 从文件路径派生服务日
    pub fn derive_service_day(&self, file_path: &str) -> ServiceDay {
        ServiceDay::ORDER
            .into_iter()
            .find(|day| file_path.contains(weekday_name(*day)))
            .map(ServiceDay::new)
            .unwrap_or_default()
    }

    /// 派生单个工作表的完整上下文
    pub fn derive_context(
        &self,
        import_id: ImportId,
        file_path: &str,
        sheet_name: &str,
    ) -> ImportContext {
        ImportContext {
            import_id,
            route: sheet_name.to_string(),
            branch: self.derive_branch(file_path),
            service_day: self.derive_service_day(file_path),
        }
    }
}
